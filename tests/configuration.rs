use floatplay::WidgetConfig;
use floatplay::color::opaque;
use floatplay::config::ConfigError;
use std::time::Duration;

fn from_toml(text: &str) -> Result<WidgetConfig, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::from_str(text, config::FileFormat::Toml))
        .build()?
        .try_deserialize()
}

#[test]
fn test_partial_file_keeps_defaults() {
    let parsed = from_toml(
        r##"
        widget_height = 100.0
        cross_overlapped_color = "#c00"
        edge_offset_x_expanded = 0.0
        poll_interval_ms = 250
        "##,
    )
    .unwrap();
    let config = parsed.build().unwrap();
    assert_eq!(config.radius(), 50.0);
    assert_eq!(config.widget_width, 600.0);
    assert_eq!(config.cross_overlapped_color, opaque(0xcc, 0, 0));
    assert_eq!(config.edge_offset_expanded.x, 0.0);
    assert_eq!(config.edge_offset_expanded.y, 32.0);
    assert_eq!(config.poll_interval, Duration::from_millis(250));
}

#[test]
fn test_malformed_colour_is_rejected_while_loading() {
    assert!(from_toml(r#"dark_color = "purple""#).is_err());
}

#[test]
fn test_inverted_bubble_range_fails_to_build() {
    let parsed = from_toml(
        r#"
        bubbles_min_size = 40.0
        bubbles_max_size = 12.0
        "#,
    )
    .unwrap();
    let err = parsed.build().unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(err.to_string().contains("Bubbles max size"));
}

#[test]
fn test_negative_sizes_fail_to_build() {
    for key in ["widget_padding", "cross_stroke_width", "bubbles_min_size", "touch_slop"] {
        let parsed = from_toml(&format!("{key} = -3.0")).unwrap();
        assert!(
            matches!(parsed.build(), Err(ConfigError::Invalid(_))),
            "{key}"
        );
    }
}
