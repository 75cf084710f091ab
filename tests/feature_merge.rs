use gridiron_features::feature_merge::{
    ScheduleGame, build_feature_table, merge_team_features,
};
use gridiron_features::temporal::{TeamFeatureRow, TeamFeatureTable};

fn game(season: i32, week: u32, home: &str, away: &str, result: Option<f64>) -> ScheduleGame {
    ScheduleGame {
        game_id: format!("{season}_{week:02}_{away}_{home}"),
        season,
        week,
        season_type: "REG".to_string(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        result,
        spread_line: Some(-3.0),
        total_line: Some(47.5),
    }
}

fn team_row(season: i32, week: u32, team: &str, value: f64) -> TeamFeatureRow {
    TeamFeatureRow {
        season,
        week,
        team: team.to_string(),
        game_id: String::new(),
        values: vec![value],
    }
}

fn team_features(rows: Vec<TeamFeatureRow>) -> TeamFeatureTable {
    TeamFeatureTable {
        columns: vec!["rushing_yards_season_avg".to_string()],
        rows,
    }
}

#[test]
fn completed_game_gets_both_sides() {
    let games = vec![game(2023, 5, "KC", "SF", Some(7.0))];
    let features = team_features(vec![
        team_row(2023, 5, "KC", 120.0),
        team_row(2023, 5, "SF", 95.0),
        team_row(2023, 5, "DAL", 1.0),
    ]);

    let table = build_feature_table(&games, &features);
    assert_eq!(table.rows.len(), 1);
    let row = &table.rows[0];
    assert_eq!(table.value(row, "home_rushing_yards_season_avg"), Some(120.0));
    assert_eq!(table.value(row, "away_rushing_yards_season_avg"), Some(95.0));
    assert_eq!(row.result, Some(7.0));
    assert_eq!(
        table.header(),
        vec![
            "game_id",
            "season",
            "week",
            "home_team",
            "away_team",
            "spread_line",
            "total_line",
            "result",
            "home_rushing_yards_season_avg",
            "away_rushing_yards_season_avg",
        ]
    );
}

#[test]
fn opening_week_and_unplayed_games_are_excluded() {
    let games = vec![
        game(2022, 1, "KC", "SF", Some(3.0)),
        game(2023, 1, "DAL", "NYG", Some(-3.0)),
        game(2023, 2, "KC", "SF", None),
        game(2023, 2, "DAL", "NYG", Some(10.0)),
    ];
    let features = team_features(vec![
        team_row(2023, 2, "DAL", 1.0),
        team_row(2023, 2, "NYG", 2.0),
    ]);

    let table = build_feature_table(&games, &features);
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].home_team, "DAL");
    assert!(table.rows.iter().all(|row| row.week != 1));
}

#[test]
fn unmatched_side_is_missing_not_zero() {
    let games = vec![game(2023, 5, "KC", "SF", Some(7.0))];
    let features = team_features(vec![team_row(2023, 5, "KC", 120.0)]);

    let table = merge_team_features(&games, &features);
    let row = table.find(&games[0].game_id).unwrap();
    assert_eq!(row.home, vec![Some(120.0)]);
    assert_eq!(row.away, vec![None]);
    assert_eq!(table.value(row, "away_rushing_yards_season_avg"), None);
}
