mod common;

use approx::assert_relative_eq;

use common::{GameFixture, PlayFixture, pbp_table};
use gridiron_features::error::FeatureError;
use gridiron_features::game_stats::GameStat;
use gridiron_features::pipeline::{SeasonType, create_final_feature_set};
use gridiron_features::play_table::{Cell, PlayTable};
use gridiron_features::temporal::TemporalConfig;

fn season() -> PlayTable {
    pbp_table(&[
        (
            GameFixture::new(2023, 1, "KC", "SF"),
            vec![
                PlayFixture::rush("KC", 100.0),
                PlayFixture::rush("SF", 50.0),
                PlayFixture::third_down("KC", true),
                PlayFixture::third_down("KC", false),
            ],
        ),
        (
            GameFixture::new(2023, 2, "SF", "KC"),
            vec![
                PlayFixture::rush("KC", 200.0),
                PlayFixture::rush("SF", 80.0),
                PlayFixture::pass_td("SF", "SF"),
            ],
        ),
        (
            GameFixture::new(2023, 3, "KC", "SF"),
            vec![PlayFixture::rush("KC", 10.0), PlayFixture::pass("SF", 30.0)],
        ),
        (
            GameFixture::new(2023, 4, "KC", "SF").unplayed(),
            vec![PlayFixture::rush("KC", 1.0)],
        ),
        (
            GameFixture::new(2023, 19, "KC", "SF").post(),
            vec![PlayFixture::rush("KC", 999.0)],
        ),
    ])
}

fn config() -> TemporalConfig {
    TemporalConfig::new(
        vec![1],
        vec![
            GameStat::RushingYards,
            GameStat::RushingYardsAllowed,
            GameStat::PassingTds,
            GameStat::ThirdDownConvRate,
        ],
    )
    .unwrap()
}

#[test]
fn regular_season_features_are_point_in_time() {
    let table = create_final_feature_set(&season(), SeasonType::Regular, &config()).unwrap();

    let weeks = table.rows.iter().map(|r| r.week).collect::<Vec<_>>();
    assert_eq!(weeks, vec![2, 3]);
    assert_eq!(table.feature_names.len(), 8);

    let week2 = table.find("2023_02_KC_SF").unwrap();
    assert_eq!(week2.home_team, "SF");
    assert_relative_eq!(table.value(week2, "home_rushing_yards_season_avg").unwrap(), 50.0);
    assert_relative_eq!(table.value(week2, "away_rushing_yards_season_avg").unwrap(), 100.0);
    assert_relative_eq!(
        table.value(week2, "away_third_down_conv_rate_season_avg").unwrap(),
        0.5
    );
    assert_eq!(week2.spread_line, Some(-2.5));

    let week3 = table.find("2023_03_SF_KC").unwrap();
    assert_relative_eq!(table.value(week3, "home_rushing_yards_season_avg").unwrap(), 150.0);
    assert_relative_eq!(table.value(week3, "home_rushing_yards_last_1").unwrap(), 200.0);
    assert_relative_eq!(
        table.value(week3, "home_rushing_yards_allowed_season_avg").unwrap(),
        65.0
    );
    assert_relative_eq!(table.value(week3, "away_passing_tds_season_avg").unwrap(), 0.5);
}

#[test]
fn postseason_uses_only_postseason_plays() {
    let table = create_final_feature_set(&season(), SeasonType::Post, &config()).unwrap();
    assert_eq!(table.rows.len(), 1);
    let row = &table.rows[0];
    assert_eq!(row.week, 19);
    assert!(row.home.iter().all(|v| *v == Some(0.0)));
}

#[test]
fn missing_schema_columns_are_reported() {
    let table = PlayTable::from_rows(
        &["game_id", "season"],
        vec![vec![Cell::from("g1"), Cell::Int(2023)]],
    )
    .unwrap();
    let err = create_final_feature_set(&table, SeasonType::Regular, &config()).unwrap_err();
    match err {
        FeatureError::MissingColumns { columns, .. } => {
            assert!(columns.contains(&"week".to_string()));
            assert!(columns.contains(&"fumble_lost".to_string()));
            assert!(!columns.contains(&"season".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn no_rows_of_the_requested_season_type_is_an_error() {
    let table = pbp_table(&[(
        GameFixture::new(2023, 2, "KC", "SF"),
        vec![PlayFixture::rush("KC", 5.0)],
    )]);
    let err = create_final_feature_set(&table, SeasonType::Post, &config()).unwrap_err();
    assert!(matches!(err, FeatureError::EmptyInput));
}
