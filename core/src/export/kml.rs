use crate::export::fields::{altitude, coord, field, iso};
use crate::export::ExportRequest;
use crate::model::{CellStatus, GridCell};
use crate::prelude::{QualityBand, QualityFlag, SurveyError, SurveyResult};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";
const CIRCLE_ICON: &str = "http://maps.google.com/mapfiles/kml/shapes/placemark_circle.png";
const PADDLE_ICON: &str = "http://maps.google.com/mapfiles/kml/paddle/wht-blank.png";

fn reading_style(flag: QualityFlag) -> &'static str {
    match flag {
        QualityFlag::Good => "#goodReading",
        QualityFlag::Poor => "#poorReading",
    }
}

fn cell_style(status: CellStatus) -> &'static str {
    match status {
        CellStatus::Completed => "#cellCompleted",
        CellStatus::InProgress => "#cellInProgress",
        CellStatus::NotStarted => "#cellNotStarted",
    }
}

fn ring_coordinates(cell: &GridCell) -> String {
    cell.closed_ring()
        .iter()
        .map(|p| format!("{},{},0", coord(p.longitude), coord(p.latitude)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Event writer with the indentation and error mapping every KML section shares.
struct KmlWriter {
    inner: Writer<Vec<u8>>,
}

impl KmlWriter {
    fn new() -> Self {
        Self {
            inner: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn event(&mut self, event: Event<'_>) -> SurveyResult<()> {
        self.inner
            .write_event(event)
            .map_err(|e| SurveyError::Encoding(format!("failed to write KML: {e}")))
    }

    fn open(&mut self, tag: &str) -> SurveyResult<()> {
        self.event(Event::Start(BytesStart::new(tag)))
    }

    fn open_with_id(&mut self, tag: &str, id: &str) -> SurveyResult<()> {
        let mut element = BytesStart::new(tag);
        element.push_attribute(("id", id));
        self.event(Event::Start(element))
    }

    fn close(&mut self, tag: &str) -> SurveyResult<()> {
        self.event(Event::End(BytesEnd::new(tag)))
    }

    /// `<tag>text</tag>` with the text escaped by the writer.
    fn text(&mut self, tag: &str, text: &str) -> SurveyResult<()> {
        self.open(tag)?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.close(tag)
    }

    fn icon_style(
        &mut self,
        id: &str,
        color: &str,
        scale: Option<&str>,
        icon: &str,
    ) -> SurveyResult<()> {
        self.open_with_id("Style", id)?;
        self.open("IconStyle")?;
        self.text("color", color)?;
        if let Some(scale) = scale {
            self.text("scale", scale)?;
        }
        self.open("Icon")?;
        self.text("href", icon)?;
        self.close("Icon")?;
        self.close("IconStyle")?;
        self.close("Style")
    }

    fn polygon_style(&mut self, id: &str, line: &str, width: &str, fill: &str) -> SurveyResult<()> {
        self.open_with_id("Style", id)?;
        self.open("LineStyle")?;
        self.text("color", line)?;
        self.text("width", width)?;
        self.close("LineStyle")?;
        self.open("PolyStyle")?;
        self.text("color", fill)?;
        self.close("PolyStyle")?;
        self.close("Style")
    }

    fn styles(&mut self) -> SurveyResult<()> {
        self.icon_style("goodReading", "ff00ff00", Some("0.8"), CIRCLE_ICON)?;
        self.icon_style("poorReading", "ff0000ff", Some("0.8"), CIRCLE_ICON)?;
        self.polygon_style("cellCompleted", "ff00ff00", "2", "4000ff00")?;
        self.polygon_style("cellInProgress", "ff00ffff", "2", "4000ffff")?;
        self.polygon_style("cellNotStarted", "ff888888", "1", "20888888")?;
        self.icon_style("fieldNote", "ffff8800", None, PADDLE_ICON)
    }

    /// Placemark header shared by readings and notes: name, description, time and style.
    fn placemark_header(
        &mut self,
        name: &str,
        description: &str,
        when: Option<&str>,
        style: &str,
    ) -> SurveyResult<()> {
        self.open("Placemark")?;
        self.text("name", name)?;
        self.text("description", description)?;
        if let Some(when) = when {
            self.open("TimeStamp")?;
            self.text("when", when)?;
            self.close("TimeStamp")?;
        }
        self.text("styleUrl", style)
    }

    fn point(&mut self, coordinates: &str) -> SurveyResult<()> {
        self.open("Point")?;
        self.text("coordinates", coordinates)?;
        self.close("Point")
    }

    fn finish(self) -> SurveyResult<String> {
        let mut bytes = self.inner.into_inner();
        bytes.push(b'\n');
        String::from_utf8(bytes)
            .map_err(|e| SurveyError::Encoding(format!("invalid UTF-8 in KML: {e}")))
    }
}

/// KML document with a readings Folder and, when non-empty, grid and note Folders.
pub fn encode(request: &ExportRequest<'_>, quality: &QualityBand) -> SurveyResult<String> {
    let project = request.project;
    let mut w = KmlWriter::new();
    w.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    let mut root = BytesStart::new("kml");
    root.push_attribute(("xmlns", KML_NAMESPACE));
    w.event(Event::Start(root))?;
    w.open("Document")?;
    w.text("name", &project.name)?;
    w.text("description", &project.description)?;
    w.styles()?;

    w.open("Folder")?;
    w.text("name", "Magnetic Readings")?;
    for (i, reading) in request.readings.iter().enumerate() {
        let flag = quality.flag(reading.total_field);
        let mut description = format!(
            "Total Field: {} μT\nX: {} μT\nY: {} μT\nZ: {} μT\nAltitude: {} m\nQuality: {}",
            field(reading.total_field),
            field(reading.magnetic_x),
            field(reading.magnetic_y),
            field(reading.magnetic_z),
            altitude(reading.altitude_or_zero()),
            flag.as_str()
        );
        if let Some(notes) = reading.notes.as_deref().filter(|n| !n.is_empty()) {
            description.push_str(&format!("\nNotes: {}", notes));
        }
        w.placemark_header(
            &format!("MAG_{}", i + 1),
            &description,
            Some(&iso(reading.timestamp)),
            reading_style(flag),
        )?;
        w.point(&format!(
            "{},{},{}",
            coord(reading.longitude),
            coord(reading.latitude),
            altitude(reading.altitude_or_zero())
        ))?;
        w.close("Placemark")?;
    }
    w.close("Folder")?;

    if !request.cells.is_empty() {
        w.open("Folder")?;
        w.text("name", "Survey Grid")?;
        for cell in request.cells {
            w.placemark_header(
                &format!("Cell {}", cell.id()),
                &format!("Status: {}\nPoints: {}", cell.status, cell.point_count),
                None,
                cell_style(cell.status),
            )?;
            w.open("Polygon")?;
            w.open("outerBoundaryIs")?;
            w.open("LinearRing")?;
            w.text("coordinates", &ring_coordinates(cell))?;
            w.close("LinearRing")?;
            w.close("outerBoundaryIs")?;
            w.close("Polygon")?;
            w.close("Placemark")?;
        }
        w.close("Folder")?;
    }

    if !request.notes.is_empty() {
        w.open("Folder")?;
        w.text("name", "Field Notes")?;
        for (i, note) in request.notes.iter().enumerate() {
            w.placemark_header(
                &format!("NOTE_{}", i + 1),
                &note.content,
                Some(&iso(note.timestamp)),
                "#fieldNote",
            )?;
            w.point(&format!("{},{},0", coord(note.longitude), coord(note.latitude)))?;
            w.close("Placemark")?;
        }
        w.close("Folder")?;
    }

    w.close("Document")?;
    w.close("kml")?;
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures::*;

    #[test]
    fn grid_folder_is_omitted_without_cells() {
        let project = project();
        let readings = readings();
        let request = ExportRequest {
            project: &project,
            readings: &readings,
            cells: &[],
            notes: &[],
        };
        let out = encode(&request, &QualityBand::default()).unwrap();
        assert_eq!(out.matches("<Folder>").count(), 1);
        assert!(!out.contains("Survey Grid"));
        assert!(!out.contains("Field Notes"));
        assert_eq!(out.matches("<styleUrl>#goodReading</styleUrl>").count(), 2);
        assert!(out.contains("<coordinates>-0.18000000,5.60000000,12.50</coordinates>"));
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(out.contains("<kml xmlns=\"http://www.opengis.net/kml/2.2\">"));
    }

    #[test]
    fn cells_are_styled_by_status_with_closed_rings() {
        let project = project();
        let cells = vec![
            cell(0, 0, CellStatus::Completed),
            cell(0, 1, CellStatus::InProgress),
            cell(1, 0, CellStatus::NotStarted),
        ];
        let request = ExportRequest {
            project: &project,
            readings: &[],
            cells: &cells,
            notes: &[],
        };
        let out = encode(&request, &QualityBand::default()).unwrap();
        assert!(out.contains("<name>Survey Grid</name>"));
        assert!(out.contains("<styleUrl>#cellCompleted</styleUrl>"));
        assert!(out.contains("<styleUrl>#cellInProgress</styleUrl>"));
        assert!(out.contains("<styleUrl>#cellNotStarted</styleUrl>"));
        assert!(out.contains("<name>Cell 1_0</name>"));

        let ring = "0.00000000,0.00000000,0 1.00000000,0.00000000,0 1.00000000,1.00000000,0 \
                    0.00000000,1.00000000,0 0.00000000,0.00000000,0";
        assert_eq!(out.matches(ring).count(), 3);
    }

    #[test]
    fn poor_readings_and_markup_are_escaped() {
        let mut project = project();
        project.name = "Ridge <A> & B".into();
        let readings = vec![reading(1.0, 2.0, 90.0, 0).with_notes("pipe < 2m")];
        let notes = vec![note("gate & fence", false, false)];
        let request = ExportRequest {
            project: &project,
            readings: &readings,
            cells: &[],
            notes: &notes,
        };
        let out = encode(&request, &QualityBand::default()).unwrap();
        assert!(out.contains("<name>Ridge &lt;A&gt; &amp; B</name>"));
        assert!(out.contains("<styleUrl>#poorReading</styleUrl>"));
        assert!(out.contains("Notes: pipe &lt; 2m"));
        assert!(out.contains("<name>Field Notes</name>"));
        assert!(out.contains("<description>gate &amp; fence</description>"));
        assert!(out.ends_with("</Document>\n</kml>\n"));
    }
}
