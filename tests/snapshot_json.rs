// Shape of the payloads sent to the webview.

use percent_racer_lib::game_server::race::{Answer, EndReason, GameOver, RaceConfig, RaceEvent};
use percent_racer_lib::game_server::simulation::{GameServer, Screen};
use serde_json::{json, Value};

fn started_server() -> GameServer {
    let mut server = GameServer::with_config(RaceConfig {
        seed: Some(7),
        ..Default::default()
    });
    server.select_racer("car").unwrap();
    server.start_race().unwrap();
    server
}

#[test]
fn snapshot_fields_for_frontend() {
    let server = started_server();
    let snapshot = server.get_snapshot().unwrap();
    let value = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(value["status"], json!("Active"));
    assert_eq!(value["time_remaining"], json!(90));
    assert_eq!(value["score"], json!(0));
    assert_eq!(value["racer_position"], json!(0));
    assert_eq!(value["standing"], json!("Third"));
    assert_eq!(value["standing_label"], json!("3rd"));
    assert_eq!(value["racer"]["id"], json!("car"));
    assert_eq!(value["question_time_remaining"], json!(10));
    assert_eq!(value["selected_answer"], Value::Null);
    assert_eq!(value["answers_locked"], json!(false));
    assert_eq!(value["encouragement"], Value::Null);

    let options = value["options"].as_array().unwrap();
    assert_eq!(options.len(), snapshot.question.as_ref().unwrap().options.len());
    assert!(options.iter().all(|o| o["highlight"] == json!("Neutral")));
}

#[test]
fn answered_snapshot_carries_feedback() {
    let mut server = started_server();
    let correct = server.get_snapshot().unwrap().question.unwrap().correct_answer;
    let snapshot = server.submit_answer(Answer::Choice(correct)).unwrap();
    let value = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(value["selected_answer"], json!({ "Choice": correct }));
    assert_eq!(value["encouragement"], json!("Great thinking!"));
    assert_eq!(value["speed_boost"], json!(true));
    assert_eq!(value["answers_locked"], json!(true));
}

#[test]
fn game_over_payload() {
    let over = GameOver {
        final_score: 150,
        reason: EndReason::TimeUp,
        time_remaining: 0,
    };
    assert_eq!(
        serde_json::to_value(RaceEvent::GameOver(over)).unwrap(),
        json!({ "GameOver": { "final_score": 150, "reason": "TimeUp", "time_remaining": 0 } })
    );
}

#[test]
fn server_reports_single_game_over() {
    let mut server = started_server();
    let mut overs = 0;
    for _ in 0..120 {
        server.tick();
        overs += server
            .drain_events()
            .iter()
            .filter(|e| matches!(e, RaceEvent::GameOver(_)))
            .count();
    }
    assert_eq!(overs, 1);
    assert_eq!(server.get_screen(), Screen::GameOver);
    assert_eq!(server.get_result().unwrap().final_score, 0);
}
