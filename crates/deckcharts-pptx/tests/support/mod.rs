#![allow(dead_code)]

use std::io::{Cursor, Write};

use deckcharts_pptx::chart::{
    CONTENT_TYPE_CHART_COLORS, CONTENT_TYPE_CHART_STYLE, REL_TYPE_CHART_COLORS,
    REL_TYPE_CHART_STYLE,
};
use deckcharts_pptx::{ChartData, ChartFrame, PptxPackage, SeriesValues};
use roxmltree::Document;
use zip::write::FileOptions;

pub const SLIDE_1: &str = "ppt/slides/slide1.xml";
pub const SLIDE_2: &str = "ppt/slides/slide2.xml";

pub const STYLE_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cs:chartStyle xmlns:cs="http://schemas.microsoft.com/office/drawing/2012/chartStyle" id="201"/>"#;

pub const COLORS_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cs:colorStyle xmlns:cs="http://schemas.microsoft.com/office/drawing/2012/chartStyle" meth="cycle" id="10"/>"#;

pub const DRAWING_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<c:userShapes xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart"/>"#;

pub const REL_TYPE_USER_SHAPES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/chartUserShapes";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
  <Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>
  <Override PartName="/ppt/slides/slide2.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>
</Types>
"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>
"#;

// Slide 2 comes first in the deck even though its relationship id is higher.
const PRESENTATION_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:sldIdLst><p:sldId id="256" r:id="rId3"/><p:sldId id="257" r:id="rId2"/></p:sldIdLst>
  <p:sldSz cx="12192000" cy="6858000"/>
</p:presentation>
"#;

const PRESENTATION_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide2.xml"/>
</Relationships>
"#;

const SLIDE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
</Relationships>
"#;

pub fn slide_xml(title: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld>
    <p:spTree>
      <p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
      <p:grpSpPr/>
      <p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>{title}</a:t></a:r></a:p></p:txBody></p:sp>
    </p:spTree>
  </p:cSld>
</p:sld>
"#
    )
}

/// Zip a minimal two-slide deck, plus `extra` parts.
pub fn build_pptx(extra: &[(&str, &[u8])]) -> Vec<u8> {
    let slide_1 = slide_xml("Forecast");
    let slide_2 = slide_xml("Appendix");
    let mut entries: Vec<(&str, &[u8])> = vec![
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
        ("_rels/.rels", ROOT_RELS_XML.as_bytes()),
        ("ppt/presentation.xml", PRESENTATION_XML.as_bytes()),
        ("ppt/_rels/presentation.xml.rels", PRESENTATION_RELS_XML.as_bytes()),
        (SLIDE_1, slide_1.as_bytes()),
        ("ppt/slides/_rels/slide1.xml.rels", SLIDE_RELS_XML.as_bytes()),
        (SLIDE_2, slide_2.as_bytes()),
        ("ppt/slides/_rels/slide2.xml.rels", SLIDE_RELS_XML.as_bytes()),
    ];
    entries.extend_from_slice(extra);

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut cursor);
        let options =
            FileOptions::<()>::default().compression_method(zip::CompressionMethod::Deflated);
        for (name, bytes) in entries {
            zip.start_file(name, options).unwrap();
            zip.write_all(bytes).unwrap();
        }
        zip.finish().unwrap();
    }
    cursor.into_inner()
}

pub fn deck() -> PptxPackage {
    PptxPackage::from_bytes(&build_pptx(&[])).unwrap()
}

pub fn frame() -> ChartFrame {
    ChartFrame {
        x: 838_200,
        y: 1_825_625,
        cx: 10_515_600,
        cy: 4_351_338,
    }
}

pub fn data(categories: &[&str], series: &[(&str, &[Option<f64>])]) -> ChartData {
    ChartData::new(
        categories.iter().map(|c| c.to_string()).collect(),
        series
            .iter()
            .map(|(name, values)| SeriesValues {
                name: name.to_string(),
                values: values.to_vec(),
            })
            .collect(),
    )
    .unwrap()
}

/// The forecast dataset: two vintages of one category and the target line.
pub fn forecast_data() -> ChartData {
    data(
        &["2021", "2022"],
        &[
            ("A_-1", &[Some(10.0), Some(12.5)]),
            ("A_0", &[Some(4.0), None]),
            ("Target NAV (Line)", &[Some(20.0), Some(21.0)]),
        ],
    )
}

/// Give `chart_part` chart style/colors parts and a user-shapes drawing referenced from its XML.
pub fn decorate_chart(package: &mut PptxPackage, chart_part: &str) {
    let style = package
        .create_part("ppt/charts/style{N}.xml", CONTENT_TYPE_CHART_STYLE, STYLE_XML.to_vec())
        .unwrap();
    let colors = package
        .create_part("ppt/charts/colors{N}.xml", CONTENT_TYPE_CHART_COLORS, COLORS_XML.to_vec())
        .unwrap();
    let drawing = package
        .create_part(
            "ppt/drawings/drawing{N}.xml",
            "application/vnd.openxmlformats-officedocument.drawingml.chartshapes+xml",
            DRAWING_XML.to_vec(),
        )
        .unwrap();
    package
        .add_relationship(chart_part, &style, REL_TYPE_CHART_STYLE)
        .unwrap();
    package
        .add_relationship(chart_part, &colors, REL_TYPE_CHART_COLORS)
        .unwrap();
    let shapes_id = package
        .add_relationship(chart_part, &drawing, REL_TYPE_USER_SHAPES)
        .unwrap();

    let xml = part_string(package, chart_part);
    let xml = xml.replace(
        "</c:chartSpace>",
        &format!(r#"<c:userShapes r:id="{shapes_id}"/></c:chartSpace>"#),
    );
    package.set_part(chart_part, xml.into_bytes());
}

pub fn part_string(package: &PptxPackage, part: &str) -> String {
    String::from_utf8(
        package
            .part(part)
            .unwrap_or_else(|| panic!("missing part {part}"))
            .to_vec(),
    )
    .unwrap()
}

/// `@r:id` of the first element named `local` in a chart part.
pub fn rel_id_of(xml: &str, local: &str) -> Option<String> {
    let doc = Document::parse(xml).unwrap();
    let node = doc.descendants().find(|n| n.tag_name().name() == local)?;
    node.attribute((deckcharts_pptx::xml::REL_NS, "id"))
        .map(str::to_string)
}

/// `@val` of the first element named `local`.
pub fn val_of(xml: &str, local: &str) -> Option<String> {
    let doc = Document::parse(xml).unwrap();
    let node = doc.descendants().find(|n| n.tag_name().name() == local)?;
    node.attribute("val").map(str::to_string)
}
