use geocode_core::GeoCircle;

use super::*;

const BERLIN_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<places xmlns="http://www.navteq.com/lbsp/Search-Search/4" version="1.0" resultCode="OK" resultsTotal="2">
  <place title="Invalidenstraße 117, 10115 Berlin, Germany" language="ENG">
    <location>
      <position>
        <latitude>52.5311</latitude>
        <longitude>13.3849</longitude>
      </position>
      <boundingBox>
        <northWest>
          <latitude>52.5320</latitude>
          <longitude>13.3834</longitude>
        </northWest>
        <southEast>
          <latitude>52.5302</latitude>
          <longitude>13.3864</longitude>
        </southEast>
      </boundingBox>
    </location>
    <address>
      <country>Germany</country>
      <countryCode>DEU</countryCode>
      <state>Berlin</state>
      <county>Berlin</county>
      <city>Berlin</city>
      <district>Mitte</district>
      <thoroughfare>
        <name>Invalidenstraße</name>
        <number>117</number>
      </thoroughfare>
      <postCode>10115</postCode>
    </address>
  </place>
  <place title="Berlin, Germany" language="ENG">
    <location>
      <position>
        <latitude>52.5170</latitude>
        <longitude>13.3889</longitude>
        <altitude>34.0</altitude>
      </position>
    </location>
  </place>
</places>"#;

fn run(xml: &str) -> Result<Vec<GeoLocation>, GeocodeParseError> {
    let mut parser = GeocodeXmlParser::new();
    parser.parse(xml);
    parser.run()
}

fn place(title: &str, lat: &str, lon: &str) -> String {
    format!(
        "<place title=\"{title}\"><location><position>\
         <latitude>{lat}</latitude><longitude>{lon}</longitude>\
         </position></location></place>"
    )
}

fn places(body: &str) -> String {
    format!("<places resultCode=\"OK\">{body}</places>")
}

#[test]
fn parses_full_response() {
    let locations = run(BERLIN_RESPONSE).expect("valid response should parse");
    assert_eq!(locations.len(), 2);

    let first = &locations[0];
    assert_eq!(first.title, "Invalidenstraße 117, 10115 Berlin, Germany");
    assert_eq!(first.language.as_deref(), Some("ENG"));
    assert!((first.coordinate.latitude - 52.5311).abs() < 1e-9);
    assert!((first.coordinate.longitude - 13.3849).abs() < 1e-9);
    assert!(!first.coordinate.has_altitude());

    let bbox = first.bounding_box.expect("bounding box present");
    assert!((bbox.top_left.latitude - 52.5320).abs() < 1e-9);
    assert!((bbox.bottom_right.longitude - 13.3864).abs() < 1e-9);
    assert!(bbox.contains(&first.coordinate));

    assert_eq!(first.address.country.as_deref(), Some("Germany"));
    assert_eq!(first.address.country_code.as_deref(), Some("DEU"));
    assert_eq!(first.address.state.as_deref(), Some("Berlin"));
    assert_eq!(first.address.county.as_deref(), Some("Berlin"));
    assert_eq!(first.address.city.as_deref(), Some("Berlin"));
    assert_eq!(first.address.district.as_deref(), Some("Mitte"));
    assert_eq!(first.address.street.as_deref(), Some("117 Invalidenstraße"));
    assert_eq!(first.address.postal_code.as_deref(), Some("10115"));

    let second = &locations[1];
    assert_eq!(second.title, "Berlin, Germany");
    assert!((second.coordinate.altitude - 34.0).abs() < 1e-9);
    assert!(second.bounding_box.is_none());
    assert!(second.address.is_empty());
}

#[test]
fn n_places_yield_n_locations_in_document_order() {
    let body: String = (0..5)
        .map(|i| place(&format!("p{i}"), &format!("{i}.5"), "1.0"))
        .collect();
    let locations = run(&places(&body)).unwrap();
    let titles: Vec<&str> = locations.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, ["p0", "p1", "p2", "p3", "p4"]);
}

#[test]
fn duplicate_places_are_preserved() {
    let one = place("same", "1.0", "2.0");
    let locations = run(&places(&format!("{one}{one}"))).unwrap();
    assert_eq!(locations.len(), 2);
    assert_eq!(locations[0], locations[1]);
}

#[test]
fn empty_places_is_success() {
    assert!(run("<places/>").unwrap().is_empty());
    assert!(run(r#"<places resultCode="OK"></places>"#).unwrap().is_empty());
}

#[test]
fn wrong_root_is_error() {
    let err = run("<results><place title=\"x\"/></results>").unwrap_err();
    assert!(err.to_string().contains("root element"), "got {err}");
    assert_eq!(err.state(), Some(ParseState::Init));
}

#[test]
fn root_name_is_case_sensitive() {
    assert!(run("<Places></Places>").is_err());
}

#[test]
fn missing_root_is_error() {
    let err = run("<?xml version=\"1.0\"?>").unwrap_err();
    assert!(err.to_string().contains("no root element"), "got {err}");
}

#[test]
fn empty_input_is_error() {
    assert!(run("").is_err());
}

#[test]
fn truncated_markup_is_error() {
    let bytes = BERLIN_RESPONSE.as_bytes();
    let mut parser = GeocodeXmlParser::new();
    parser.parse(&bytes[..bytes.len() / 2]);
    assert!(parser.run().is_err());
}

#[test]
fn mismatched_end_tag_is_error() {
    let err = run("<places><place title=\"a\"></location></places>").unwrap_err();
    assert!(matches!(err, GeocodeParseError::Xml { .. }), "got {err:?}");
}

#[test]
fn invalid_utf8_is_error() {
    let mut parser = GeocodeXmlParser::new();
    let mut bytes = br#"<places><place title=""#.to_vec();
    bytes.extend_from_slice(&[0xff, 0xfe]);
    bytes.extend_from_slice(
        br#""><location><position><latitude>1</latitude></position></location></place></places>"#,
    );
    parser.parse(bytes);
    assert!(parser.run().is_err());
}

#[test]
fn bad_bytes_inside_unknown_element_are_error() {
    let mut bytes = b"<places><metadata>".to_vec();
    bytes.extend_from_slice(&[0xff, 0xfe, 0xfd]);
    bytes.extend_from_slice(b"</metadata>");
    bytes.extend_from_slice(place("a", "1", "2").as_bytes());
    bytes.extend_from_slice(b"</places>");

    let mut parser = GeocodeXmlParser::new();
    parser.parse(bytes);
    let err = parser.run().unwrap_err();
    assert!(matches!(err, GeocodeParseError::Xml { .. }), "got {err:?}");
}

#[test]
fn bad_bytes_between_place_children_are_error() {
    let mut bytes = b"<places><place title=\"a\">".to_vec();
    bytes.push(0xff);
    bytes.extend_from_slice(
        b"<location><position><latitude>1</latitude><longitude>2</longitude></position></location></place></places>",
    );

    let mut parser = GeocodeXmlParser::new();
    parser.parse(bytes);
    assert!(parser.run().is_err());
}

#[test]
fn unknown_entity_inside_unknown_element_is_error() {
    let xml = places(&format!("<metadata>&bogus;</metadata>{}", place("a", "1", "2")));
    let err = run(&xml).unwrap_err();
    assert!(matches!(err, GeocodeParseError::Xml { .. }), "got {err:?}");
}

#[test]
fn non_numeric_longitude_degrades_to_nan() {
    let locations = run(&places(&place("a", "10.0", "east-ish"))).unwrap();
    assert_eq!(locations.len(), 1);
    assert!((locations[0].coordinate.latitude - 10.0).abs() < 1e-9);
    assert!(locations[0].coordinate.longitude.is_nan());
}

#[test]
fn out_of_range_latitude_degrades_to_nan() {
    let locations = run(&places(&place("a", "91.0", "10.0"))).unwrap();
    assert!(locations[0].coordinate.latitude.is_nan());
    assert!((locations[0].coordinate.longitude - 10.0).abs() < 1e-9);
}

#[test]
fn infinite_value_degrades_to_nan() {
    let locations = run(&places(&place("a", "inf", "10.0"))).unwrap();
    assert!(locations[0].coordinate.latitude.is_nan());
}

#[test]
fn empty_coordinate_leaves_degrade_to_nan() {
    let locations = run(&places(&place("a", "", " "))).unwrap();
    assert!(locations[0].coordinate.latitude.is_nan());
    assert!(locations[0].coordinate.longitude.is_nan());
}

#[test]
fn missing_coordinate_leaves_stay_nan() {
    let xml = places(
        "<place title=\"a\"><location><position><latitude>1.5</latitude></position></location></place>",
    );
    let locations = run(&xml).unwrap();
    assert!((locations[0].coordinate.latitude - 1.5).abs() < 1e-9);
    assert!(locations[0].coordinate.longitude.is_nan());
    assert!(locations[0].coordinate.altitude.is_nan());
}

#[test]
fn coordinate_leaves_accept_any_order() {
    let xml = places(
        "<place title=\"a\"><location><position>\
         <longitude>2</longitude><latitude>1</latitude>\
         </position></location></place>",
    );
    let c = run(&xml).unwrap()[0].coordinate;
    assert!((c.latitude - 1.0).abs() < 1e-9);
    assert!((c.longitude - 2.0).abs() < 1e-9);
}

#[test]
fn repeated_latitude_is_error() {
    let xml = places(
        "<place title=\"a\"><location><position>\
         <latitude>1</latitude><latitude>2</latitude>\
         </position></location></place>",
    );
    let err = run(&xml).unwrap_err();
    assert_eq!(err.state(), Some(ParseState::InCoordinate));
}

#[test]
fn nested_element_inside_latitude_is_error() {
    let xml = places(
        "<place title=\"a\"><location><position>\
         <latitude><value>1</value></latitude>\
         </position></location></place>",
    );
    assert!(matches!(
        run(&xml),
        Err(GeocodeParseError::Structure { .. })
    ));
}

#[test]
fn missing_address_leaves_fields_unset() {
    let locations = run(&places(&place("a", "1", "2"))).unwrap();
    assert!(locations[0].address.is_empty());
}

#[test]
fn unknown_address_fields_are_skipped() {
    let xml = places(
        "<place title=\"a\"><location><position><latitude>1</latitude><longitude>2</longitude></position></location>\
         <address type=\"postal\"><building><floor>3</floor></building><city>Oslo</city><suburb>Frogner</suburb></address></place>",
    );
    let locations = run(&xml).unwrap();
    assert_eq!(locations[0].address.city.as_deref(), Some("Oslo"));
    assert!(locations[0].address.street.is_none());
}

#[test]
fn whitespace_only_address_field_is_unset() {
    let xml = places(
        "<place title=\"a\"><location><position><latitude>1</latitude><longitude>2</longitude></position></location>\
         <address><city>   </city><country/></address></place>",
    );
    let address = &run(&xml).unwrap()[0].address;
    assert!(address.city.is_none());
    assert!(address.country.is_none());
}

#[test]
fn thoroughfare_name_only_becomes_street() {
    let xml = places(
        "<place title=\"a\"><location><position><latitude>1</latitude><longitude>2</longitude></position></location>\
         <address><thoroughfare><name>Main Street</name></thoroughfare></address></place>",
    );
    assert_eq!(run(&xml).unwrap()[0].address.street.as_deref(), Some("Main Street"));
}

#[test]
fn thoroughfare_number_only_becomes_street() {
    let xml = places(
        "<place title=\"a\"><location><position><latitude>1</latitude><longitude>2</longitude></position></location>\
         <address><thoroughfare><number>12b</number></thoroughfare></address></place>",
    );
    assert_eq!(run(&xml).unwrap()[0].address.street.as_deref(), Some("12b"));
}

#[test]
fn repeated_address_field_is_error() {
    let xml = places(
        "<place title=\"a\"><location><position><latitude>1</latitude><longitude>2</longitude></position></location>\
         <address><city>A</city><city>B</city></address></place>",
    );
    let err = run(&xml).unwrap_err();
    assert_eq!(err.state(), Some(ParseState::InAddress));
    assert!(err.to_string().contains("\"city\""), "got {err}");
}

#[test]
fn repeated_thoroughfare_is_error() {
    let street = "<thoroughfare><name>Main Street</name></thoroughfare>";
    let xml = places(&format!(
        "<place title=\"a\"><location><position><latitude>1</latitude><longitude>2</longitude></position></location>\
         <address>{street}{street}</address></place>"
    ));
    assert!(run(&xml).is_err());
}

#[test]
fn repeated_thoroughfare_number_is_error() {
    let xml = places(
        "<place title=\"a\"><location><position><latitude>1</latitude><longitude>2</longitude></position></location>\
         <address><thoroughfare><number>1</number><number>2</number></thoroughfare></address></place>",
    );
    let err = run(&xml).unwrap_err();
    assert!(err.to_string().contains("\"number\""), "got {err}");
}

#[test]
fn address_entities_are_unescaped() {
    let xml = places(
        "<place title=\"a\"><location><position><latitude>1</latitude><longitude>2</longitude></position></location>\
         <address><city>Bosnia &amp; Herzegovina</city></address></place>",
    );
    assert_eq!(
        run(&xml).unwrap()[0].address.city.as_deref(),
        Some("Bosnia & Herzegovina")
    );
}

#[test]
fn broken_second_place_aborts_whole_document() {
    let good = place("good", "1", "2");
    let broken = "<place title=\"broken\"><location><position><latitude>1</latitude></location></place>";
    let result = run(&places(&format!("{good}{broken}")));
    assert!(result.is_err(), "partial results must never be returned");
}

#[test]
fn place_without_location_is_error() {
    let xml = places(&format!(
        "{}<place title=\"b\"><address><city>x</city></address></place>",
        place("a", "1", "2")
    ));
    let err = run(&xml).unwrap_err();
    assert_eq!(err.state(), Some(ParseState::InPlace));
    assert!(err.to_string().contains("\"location\""), "got {err}");
}

#[test]
fn place_without_title_is_error() {
    let xml = places(
        "<place><location><position><latitude>1</latitude><longitude>2</longitude></position></location></place>",
    );
    let err = run(&xml).unwrap_err();
    assert!(err.to_string().contains("\"title\""), "got {err}");
}

#[test]
fn place_with_two_locations_is_error() {
    let loc = "<location><position><latitude>1</latitude><longitude>2</longitude></position></location>";
    let xml = places(&format!("<place title=\"a\">{loc}{loc}</place>"));
    assert!(run(&xml).is_err());
}

#[test]
fn place_with_two_addresses_is_error() {
    let xml = places(
        "<place title=\"a\"><location><position><latitude>1</latitude><longitude>2</longitude></position></location>\
         <address/><address/></place>",
    );
    assert!(run(&xml).is_err());
}

#[test]
fn location_without_position_is_error() {
    let xml = places("<place title=\"a\"><location></location></place>");
    let err = run(&xml).unwrap_err();
    assert_eq!(err.state(), Some(ParseState::InLocation));
}

#[test]
fn alternatives_and_unknown_place_children_are_skipped() {
    let xml = places(
        "<place title=\"a\"><alternatives><alternative title=\"b\"/></alternatives>\
         <rating>5</rating>\
         <location><position><latitude>1</latitude><longitude>2</longitude></position></location></place>",
    );
    assert_eq!(run(&xml).unwrap().len(), 1);
}

#[test]
fn unknown_top_level_children_are_skipped() {
    let xml = places(&format!(
        "<metadata><source>test</source></metadata>{}<copyright/>",
        place("a", "1", "2")
    ));
    let locations = run(&xml).unwrap();
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].title, "a");
}

#[test]
fn bounding_box_missing_corner_is_error() {
    let xml = places(
        "<place title=\"a\"><location><position><latitude>1</latitude><longitude>2</longitude></position>\
         <boundingBox><northWest><latitude>2</latitude><longitude>1</longitude></northWest></boundingBox>\
         </location></place>",
    );
    let err = run(&xml).unwrap_err();
    assert_eq!(err.state(), Some(ParseState::InBounds));
    assert!(err.to_string().contains("southEast"), "got {err}");
}

#[test]
fn bounding_box_with_repeated_corner_is_error() {
    let corner = "<northWest><latitude>2</latitude><longitude>1</longitude></northWest>";
    let xml = places(&format!(
        "<place title=\"a\"><location><position><latitude>1</latitude><longitude>2</longitude></position>\
         <boundingBox>{corner}{corner}</boundingBox></location></place>"
    ));
    assert!(run(&xml).is_err());
}

#[test]
fn bounding_box_corner_with_bad_number_degrades() {
    let xml = places(
        "<place title=\"a\"><location><position><latitude>1</latitude><longitude>2</longitude></position>\
         <boundingBox>\
         <northWest><latitude>north</latitude><longitude>1</longitude></northWest>\
         <southEast><latitude>0</latitude><longitude>3</longitude></southEast>\
         </boundingBox></location></place>",
    );
    let bbox = run(&xml).unwrap()[0].bounding_box.unwrap();
    assert!(bbox.top_left.latitude.is_nan());
    assert!((bbox.bottom_right.longitude - 3.0).abs() < 1e-9);
}

#[test]
fn failed_result_code_reports_description() {
    let err = run(r#"<places resultCode="FAILED" resultDescription="quota exhausted"/>"#).unwrap_err();
    assert!(matches!(err, GeocodeParseError::ServiceFailure(ref d) if d == "quota exhausted"));
}

#[test]
fn failed_result_code_without_description_has_default_message() {
    let err = run(r#"<places resultCode="FAILED"/>"#).unwrap_err();
    assert!(err.to_string().contains("request failed"), "got {err}");
}

#[test]
fn unknown_result_code_is_error() {
    let err = run(r#"<places resultCode="MAYBE"/>"#).unwrap_err();
    assert!(err.to_string().contains("MAYBE"), "got {err}");
}

#[test]
fn second_root_is_error() {
    let xml = format!("{}<places/>", places(&place("a", "1", "2")));
    assert!(run(&xml).is_err());
}

#[test]
fn trailing_comment_is_allowed() {
    let xml = format!("{}<!-- served by test -->", places(&place("a", "1", "2")));
    assert_eq!(run(&xml).unwrap().len(), 1);
}

#[test]
fn same_input_parses_identically_twice() {
    let xml = places(&format!(
        "{}{}",
        place("a", "1", "oops"),
        place("b", "nan?", "2")
    ));
    let first = run(&xml).unwrap();
    let second = run(&xml).unwrap();
    assert_eq!(first, second);
    assert!(first[0].coordinate.longitude.is_nan() && second[0].coordinate.longitude.is_nan());
    assert!(first[1].coordinate.latitude.is_nan() && second[1].coordinate.latitude.is_nan());
}

#[test]
fn bounds_do_not_filter_results() {
    let mut parser = GeocodeXmlParser::new();
    parser.set_bounds(GeoShape::from(GeoCircle::new(
        GeoCoordinate::new(-33.86, 151.2),
        1_000.0,
    )));
    parser.parse(BERLIN_RESPONSE);
    assert_eq!(parser.run().unwrap().len(), 2);
}

#[test]
fn bounds_are_not_injected_into_output() {
    let mut parser = GeocodeXmlParser::new();
    let rect = GeoRectangle::new(GeoCoordinate::new(10.0, 0.0), GeoCoordinate::new(0.0, 10.0));
    parser.set_bounds(GeoShape::from(rect));
    assert_eq!(parser.bounds(), &GeoShape::Rectangle(rect));
    parser.parse(places(&place("a", "5", "5")));
    let locations = parser.run().unwrap();
    assert!(locations[0].bounding_box.is_none());
}

#[test]
fn error_message_includes_position() {
    let err = run("<places><place title=\"a\"></place></places>").unwrap_err();
    let position = err.position().expect("structure errors carry a position");
    assert!(position > 0);
    assert!(err.to_string().contains(&format!("byte {position}")), "got {err}");
}
