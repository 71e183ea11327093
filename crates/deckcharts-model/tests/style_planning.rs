use deckcharts_model::{
    shade, ChartRole, FillStyle, LineStyle, MarkerShape, Rgb, SeriesStylePlanner, StyleConfig,
    WellKnownSeries, DEFAULT_PALETTE, TARGET_NAV_LINE,
};
use pretty_assertions::assert_eq;

fn fill_color(style: &deckcharts_model::SeriesStyle) -> Option<Rgb> {
    style.fill.and_then(|fill| fill.color())
}

#[test]
fn vintages_of_one_category_share_a_hue() {
    let planner = SeriesStylePlanner::default();
    let names = ["PE_-2", "PE_-1", "PE_0", "PE_1", "Infra_-1", "Infra_0", TARGET_NAV_LINE];
    let styles = planner.plan_styles(ChartRole::StackedForecastWithTargetLine, &names);

    let pe = DEFAULT_PALETTE[0];
    let infra = DEFAULT_PALETTE[1];
    let colors: Vec<_> = styles.iter().map(fill_color).collect();
    assert_eq!(
        colors,
        vec![
            Some(shade(pe, Some(-2))),
            Some(shade(pe, Some(-1))),
            Some(pe),
            Some(shade(pe, Some(1))),
            Some(shade(infra, Some(-1))),
            Some(infra),
            None,
        ]
    );
    assert_eq!(styles[6], WellKnownSeries::TargetNavLine.style());
}

#[test]
fn reordering_series_changes_slots_not_rules() {
    let planner = SeriesStylePlanner::default();
    let forward = planner.plan_styles(ChartRole::StackedSubAllocation, &["A_0", "B_0"]);
    let reversed = planner.plan_styles(ChartRole::StackedSubAllocation, &["B_0", "A_0"]);
    assert_eq!(fill_color(&forward[0]), fill_color(&reversed[0]));
    assert_eq!(forward[1].line, reversed[1].line);
}

#[test]
fn configured_palette_drives_assignment() {
    let config = StyleConfig::from_json_str(
        r#"{ "palette": ["112233", "445566"], "shade": { "lightenStep": 0.5 } }"#,
    )
    .unwrap();
    let planner = SeriesStylePlanner::new(config);

    let styles = planner.plan_styles(ChartRole::CashflowPlot, &["A_0", "B_1", "C_0"]);
    assert_eq!(fill_color(&styles[0]), Some(Rgb::from_u32(0x112233)));
    // 0x44 + (0xFF - 0x44) * 0.5 = 161.5, 0x55 -> 170, 0x66 -> 178.5
    assert_eq!(fill_color(&styles[1]), Some(Rgb::new(161, 170, 178)));
    // Third category wraps to the first slot of a two-color palette.
    assert_eq!(fill_color(&styles[2]), Some(Rgb::from_u32(0x112233)));
}

#[test]
fn aggregate_lines_have_no_markers() {
    let planner = SeriesStylePlanner::default();
    let styles = planner.plan_styles(ChartRole::AggregateLine, &["Total NAV", "Liquidity limit"]);

    assert_eq!(styles[0].line, Some(LineStyle::solid(DEFAULT_PALETTE[0], 225)));
    assert_eq!(styles[0].marker.map(|m| m.shape), Some(MarkerShape::None));
    assert_eq!(styles[1], WellKnownSeries::LiquidityLimit.style());
    assert_eq!(styles[1].fill, Some(FillStyle::None));
}

#[test]
fn plans_serialize_for_inspection() {
    let planner = SeriesStylePlanner::default();
    let styles = planner.plan_styles(ChartRole::BarAllocation, &["Buyout"]);
    let json = serde_json::to_value(&styles).unwrap();
    assert_eq!(json[0]["fill"]["color"], "1F3864");
    assert_eq!(json[0]["line"]["fill"]["type"], "none");
}
