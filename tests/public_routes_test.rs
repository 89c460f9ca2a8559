mod common;

use actix_web::test;
use serde_json::json;

use common::TestApp;

#[actix_rt::test]
async fn test_weather_requires_city() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/weather?city=%20")
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn test_weather_without_key() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/weather?city=Kandy")
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 503);
}

#[actix_rt::test]
async fn test_directions_need_two_stops() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/directions")
        .set_json(&json!({ "stops": [{ "lat": 6.9271, "lon": 79.8612 }] }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Minimum 2 stops required");
}

#[actix_rt::test]
async fn test_directions_estimate_without_key() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/directions")
        .set_json(&json!({
            "stops": [
                { "lat": 6.9271, "lon": 79.8612, "name": "Colombo" },
                { "lat": 7.2906, "lon": 80.6337, "name": "Kandy" },
                { "lat": 6.9497, "lon": 80.7891, "name": "Nuwara Eliya" }
            ]
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["estimated"], true);
    assert_eq!(body["stops"].as_array().unwrap().len(), 3);
    assert!(body["distance_km"].as_f64().unwrap() > 100.0);
}

#[actix_rt::test]
async fn test_train_stations_are_listed() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/trains/stations")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    let stations = body.as_array().unwrap();
    assert_eq!(stations.len(), 5);
    assert_eq!(stations[0]["name"], "Colombo");
    assert_eq!(stations[4]["description"], "Scenic village, Nine Arch Bridge");
}

#[actix_rt::test]
async fn test_train_search() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/trains?from=Hatton&to=ella")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["from"], "Hatton");
    assert_eq!(body["to"], "Ella");
    let trains = body["trains"].as_array().unwrap();
    assert_eq!(trains.len(), 2);
    assert_eq!(trains[0]["name"], "Podi Menike");
    assert_eq!(trains[0]["departs"], "11:30");
    assert_eq!(trains[0]["classes"], json!(["2nd", "3rd"]));
}

#[actix_rt::test]
async fn test_train_search_rejections() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let cases = [
        ("/api/trains?from=Kandy", "Please select both departure and destination stations"),
        ("/api/trains?from=Kandy&to=Kandy", "Departure and destination cannot be the same"),
        ("/api/trains?from=Jaffna&to=Kandy", "Unknown station: Jaffna"),
    ];
    for (uri, message) in cases {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400, "{}", uri);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], message);
    }
}
