use serde_json::Value;
use sld_terria::emitter::MapType;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;
use sld_terria::{
    translate, Bound, DiscreteColorMap, RendererMode, ResourceKind, SldError, TranslateOptions,
};

const LSS_COMBINE: &str = include_str!("fixtures/LSSCombine.sld");

const LSS_BINS: [f64; 5] = [0.2, 0.5, 0.68, 0.72, 1.0];
const LSS_COLORS: [&str; 5] = ["#FFFFBF", "#FEE787", "#FD8D3C", "#F03B20", "#BD0026"];

fn options(kind: ResourceKind, mode: RendererMode) -> TranslateOptions {
    TranslateOptions::new(kind, mode)
}

fn rule_xml(title: &str, filter: &str, fill: Option<&str>) -> String {
    let symbolizer = match fill {
        Some(color) => format!(
            r#"<PolygonSymbolizer><Fill><CssParameter name="fill">{}</CssParameter></Fill></PolygonSymbolizer>"#,
            color
        ),
        None => "<PolygonSymbolizer><Fill/></PolygonSymbolizer>".to_string(),
    };
    format!(
        "<Rule><Title>{}</Title><ogc:Filter>{}</ogc:Filter>{}</Rule>",
        title, filter, symbolizer
    )
}

fn sld(rules: &[String]) -> String {
    format!(
        r#"<?xml version="1.0"?>
<StyledLayerDescriptor version="1.0.0" xmlns="http://www.opengis.net/sld" xmlns:ogc="http://www.opengis.net/ogc">
  <NamedLayer><Name>test</Name><UserStyle><FeatureTypeStyle>{}</FeatureTypeStyle></UserStyle></NamedLayer>
</StyledLayerDescriptor>"#,
        rules.concat()
    )
}

fn less_than(property: &str, value: &str) -> String {
    format!(
        "<ogc:PropertyIsLessThan><ogc:PropertyName>{}</ogc:PropertyName><ogc:Literal>{}</ogc:Literal></ogc:PropertyIsLessThan>",
        property, value
    )
}

fn equal_to(property: &str, value: &str) -> String {
    format!(
        "<ogc:PropertyIsEqualTo><ogc:PropertyName>{}</ogc:PropertyName><ogc:Literal>{}</ogc:Literal></ogc:PropertyIsEqualTo>",
        property, value
    )
}

fn contains_key(value: &Value, key: &str) -> bool {
    match value {
        Value::Object(map) => map.contains_key(key) || map.values().any(|v| contains_key(v, key)),
        Value::Array(items) => items.iter().any(|v| contains_key(v, key)),
        _ => false,
    }
}

#[test]
fn test_lss_combine_vector_bins() {
    let translation = translate(
        LSS_COMBINE.as_bytes(),
        &options(ResourceKind::Vector, RendererMode::Discrete),
    )
    .unwrap();
    assert!(translation.defects.is_empty(), "{:?}", translation.defects);

    let config = &translation.config;
    assert_eq!(config.styles.len(), 1);
    assert_eq!(config.active_style.as_deref(), Some("LSSCombine"));

    let color = &config.styles[0].color;
    assert_eq!(color.map_type, MapType::Bin);
    assert_eq!(color.color_column, "LSSCombine");
    assert_eq!(color.bin_maximums.as_deref(), Some(&LSS_BINS[..]));
    assert_eq!(
        color.bin_colors.clone().unwrap(),
        LSS_COLORS.iter().map(|c| c.to_string()).collect::<Vec<_>>()
    );

    let legend: Vec<(&str, &str)> = config.legends[0]
        .items
        .iter()
        .map(|i| (i.title.as_str(), i.color.as_str()))
        .collect();
    assert_eq!(
        legend,
        vec![
            ("0 - 0.2", "#FFFFBF"),
            ("0.2 - 0.5", "#FEE787"),
            ("0.5 - 0.68", "#FD8D3C"),
            ("0.68 - 0.72", "#F03B20"),
            ("0.72 - 1", "#BD0026"),
        ]
    );
}

#[test]
fn test_no_forced_rendering_keys() {
    for kind in [ResourceKind::Raster, ResourceKind::Vector, ResourceKind::Csv] {
        for mode in [RendererMode::Discrete, RendererMode::Continuous] {
            let translation = translate(LSS_COMBINE.as_bytes(), &options(kind, mode)).unwrap();
            let value = translation.config.to_value().unwrap();
            assert!(!contains_key(&value, "forceCesiumPrimitives"), "{} {}", kind, mode);
            assert!(!contains_key(&value, "clampToGround"), "{} {}", kind, mode);
        }
    }
}

#[test]
fn test_translation_is_idempotent() {
    let opts = options(ResourceKind::Vector, RendererMode::Continuous);
    let first = translate(LSS_COMBINE.as_bytes(), &opts).unwrap();
    let second = translate(LSS_COMBINE.as_bytes(), &opts).unwrap();
    assert_eq!(
        first.config.to_json().unwrap(),
        second.config.to_json().unwrap()
    );
}

#[test]
fn test_continuous_mode_covers_unit_interval() {
    let translation = translate(
        LSS_COMBINE.as_bytes(),
        &options(ResourceKind::Vector, RendererMode::Continuous),
    )
    .unwrap();
    let color = &translation.config.styles[0].color;
    assert_eq!(color.map_type, MapType::Continuous);
    assert_eq!(color.minimum_value, Some(0.0));
    assert_eq!(color.maximum_value, Some(1.0));

    let stops = color.bin_maximums.clone().unwrap();
    assert_eq!(stops, vec![0.0, 0.2, 0.5, 0.68, 0.72, 1.0]);
    assert!(stops.windows(2).all(|w| w[0] <= w[1]));

    let raster = translate(
        LSS_COMBINE.as_bytes(),
        &options(ResourceKind::Raster, RendererMode::Continuous),
    )
    .unwrap();
    let colors = &raster.config.render_options.unwrap().single.colors;
    assert_eq!(colors.len(), 6);
    assert_eq!(colors[0], (0.0, "#FFFFBF".to_string()));
    assert_eq!(colors[5], (1.0, "#BD0026".to_string()));
}

#[test]
fn test_missing_fill_does_not_abort() {
    let doc = sld(&[
        rule_xml("Shallow", &less_than("depth", "10"), Some("#0000ff")),
        rule_xml("Unstyled", &less_than("depth", "20"), None),
        rule_xml("Deep", &less_than("depth", "30"), Some("#ff0000")),
    ]);

    let translation = translate(doc.as_bytes(), &TranslateOptions::default()).unwrap();
    assert_eq!(translation.defects, vec![SldError::MissingColor { rule: 2 }]);

    let items = &translation.config.legends[0].items;
    assert_eq!(items.len(), 3);
    let unstyled = items.iter().find(|i| i.title == "Unstyled").unwrap();
    assert_eq!(unstyled.color, "#808080");
    assert!(items.iter().any(|i| i.title == "Shallow" && i.color == "#0000FF"));
    assert!(items.iter().any(|i| i.title == "Deep" && i.color == "#FF0000"));
}

#[test]
fn test_invalid_literal_demotes_rule() {
    let doc = sld(&[
        rule_xml("Low", &less_than("depth", "1,5"), Some("#0000ff")),
        rule_xml("High", &less_than("depth", "30"), Some("#ff0000")),
    ]);

    let translation = translate(doc.as_bytes(), &TranslateOptions::default()).unwrap();
    assert_eq!(
        translation.defects,
        vec![SldError::InvalidLiteral {
            rule: 1,
            literal: "1,5".to_string()
        }]
    );

    let color = &translation.config.styles[0].color;
    assert_eq!(color.bin_maximums, Some(vec![30.0]));
    assert_eq!(color.null_color, "#0000FF", "demoted rule becomes the null colour");
}

#[test]
fn test_mixed_numeric_and_text_rules_sort() {
    let doc = sld(&[
        rule_xml("Urban", &equal_to("landuse", "Urban"), Some("#888888")),
        rule_xml("Under 5", &less_than("landuse", "5"), Some("#00ff00")),
        rule_xml("agriculture", &equal_to("landuse", "agriculture"), Some("#ffff00")),
        rule_xml("Class 3", &equal_to("landuse", "3"), Some("#0000ff")),
    ]);

    let translation = translate(doc.as_bytes(), &TranslateOptions::default()).unwrap();
    let titles: Vec<&str> = translation
        .model
        .rules()
        .iter()
        .map(|r| r.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Under 5", "Class 3", "agriculture", "Urban"]);
}

#[test]
fn test_legend_count_excludes_exact_duplicates() {
    let doc = sld(&[
        rule_xml("A", &equal_to("zone", "A"), Some("#ff0000")),
        rule_xml("A again", &equal_to("zone", "A"), Some("#00ff00")),
        rule_xml("B", &equal_to("zone", "B"), Some("#0000ff")),
    ]);

    let translation = translate(doc.as_bytes(), &TranslateOptions::default()).unwrap();
    assert_eq!(translation.document.rules.len(), 3);
    assert_eq!(translation.config.legends[0].items.len(), 2);
    let enum_colors = translation.config.styles[0].color.enum_colors.clone().unwrap();
    assert_eq!(enum_colors[0].color, "#FF0000", "first-seen colour wins");
}

#[test]
fn test_half_open_range_round_trip() {
    let filter = "<ogc:And>
        <ogc:PropertyIsGreaterThan><ogc:PropertyName>v</ogc:PropertyName><ogc:Literal>0.2</ogc:Literal></ogc:PropertyIsGreaterThan>
        <ogc:PropertyIsLessThanOrEqualTo><ogc:PropertyName>v</ogc:PropertyName><ogc:Literal>0.5</ogc:Literal></ogc:PropertyIsLessThanOrEqualTo>
    </ogc:And>";
    let doc = sld(&[rule_xml("mid", filter, Some("#fee787"))]);

    let translation = translate(doc.as_bytes(), &TranslateOptions::default()).unwrap();
    let rule = &translation.model.rules()[0];
    assert_eq!(rule.lower_bound(), Some(Bound::exclusive(0.2)));
    assert_eq!(rule.upper_bound(), Some(Bound::inclusive(0.5)));

    let colormap = DiscreteColorMap::from_model(&translation.model);
    let bin = &colormap.bins()[0];
    assert!(!bin.contains(0.2));
    assert!(bin.contains(0.2 + f64::EPSILON));
    assert!(bin.contains(0.5));
    assert!(!bin.contains(0.5 + 1e-9));
}

#[test]
fn test_csv_style() {
    let translation = translate(
        LSS_COMBINE.as_bytes(),
        &options(ResourceKind::Csv, RendererMode::Discrete),
    )
    .unwrap();
    let value = translation.config.to_value().unwrap();
    assert_eq!(value["activeStyle"], "default");
    assert_eq!(value["styles"][0]["time"]["spreadStartTime"], true);
    assert_eq!(value["styles"][0]["color"]["colorColumn"], "LSSCombine");
}

#[test]
fn test_malformed_documents() {
    for bad in [
        "",
        "not xml at all",
        "<StyledLayerDescriptor><NamedLayer>",
        "<StyledLayerDescriptor><NamedLayer/></StyledLayerDescriptor>",
    ] {
        let result = translate(bad.as_bytes(), &TranslateOptions::default());
        assert!(
            matches!(result, Err(SldError::MalformedDocument(_))),
            "{:?} should be malformed, got {:?}",
            bad,
            result
        );
    }
}

#[test]
fn test_unmatched_rules_each_keep_a_legend_entry() {
    let like = "<ogc:PropertyIsLike wildCard=\"*\" singleChar=\".\" escape=\"!\"><ogc:PropertyName>road</ogc:PropertyName><ogc:Literal>A*</ogc:Literal></ogc:PropertyIsLike>";
    let other = r#"<Rule><Title>Other</Title><ElseFilter/><PolygonSymbolizer><Fill><CssParameter name="fill">#cccccc</CssParameter></Fill></PolygonSymbolizer></Rule>"#;
    let doc = sld(&[
        rule_xml("Low", &less_than("depth", "1,5"), Some("#0000ff")),
        rule_xml("High", &less_than("depth", "30"), Some("#ff0000")),
        rule_xml("Roads like A*", like, Some("#00ff00")),
        other.to_string(),
    ]);

    let translation = translate(doc.as_bytes(), &TranslateOptions::default()).unwrap();
    assert_eq!(translation.defects.len(), 1);

    let legend: Vec<(&str, &str)> = translation.config.legends[0]
        .items
        .iter()
        .map(|i| (i.title.as_str(), i.color.as_str()))
        .collect();
    assert_eq!(
        legend,
        vec![
            ("High", "#FF0000"),
            ("Low", "#0000FF"),
            ("Roads like A*", "#00FF00"),
            ("Other", "#CCCCCC"),
        ]
    );

    let color = &translation.config.styles[0].color;
    assert_eq!(color.bin_maximums, Some(vec![30.0]));
    assert_eq!(color.null_color, "#CCCCCC", "ElseFilter rule owns the null colour");
}

struct EventCounter(Arc<AtomicUsize>);

impl<S: tracing::Subscriber> Layer<S> for EventCounter {
    fn on_event(&self, _event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn events_during_translate(debug: bool) -> usize {
    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(EventCounter(count.clone()));
    let opts = options(ResourceKind::Vector, RendererMode::Continuous).with_debug(debug);

    tracing::subscriber::with_default(subscriber, || {
        translate(LSS_COMBINE.as_bytes(), &opts).unwrap();
        let broken = "<StyledLayerDescriptor><NamedLayer>";
        assert!(translate(broken.as_bytes(), &opts).is_err());
    });
    count.load(Ordering::SeqCst)
}

#[test]
fn test_diagnostics_only_when_debug_is_on() {
    assert_eq!(events_during_translate(false), 0);
    assert!(events_during_translate(true) > 0);
}
