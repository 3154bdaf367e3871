//! Classifier behaviour over realistic provider places.

use chrono::{TimeZone, Utc};
use local_places_classifier::{CategoryRules, Classification, Classifier, UnclassifiedReason};
use local_places_core::types::{
    AddressParts, CategoryKey, DomainItem, PhotoRef, PlaceCategory, PriceTier, ProviderPlace, ProviderPrice,
    ProviderResponse,
};

fn classifier() -> Classifier {
    Classifier::new(CategoryRules::embedded().unwrap())
}

fn fsq(id: u32, label: &str) -> PlaceCategory {
    PlaceCategory::new(CategoryKey::Id(id), label).with_parent(CategoryKey::Id(id / 1000 * 1000))
}

fn park() -> ProviderPlace {
    ProviderPlace::new("p1", "Riverside Park")
        .with_category(fsq(16032, "Park"))
        .with_category(fsq(16019, "Playground"))
        .with_coordinates(40.8, -73.97)
        .with_rating(9.0, 10.0)
}

#[test]
fn test_park_collects_amenities_and_rescales_rating() {
    let item = classifier().classify(&park(), "foursquare").unwrap();

    match item {
        DomainItem::Park(p) => {
            assert_eq!(p.park_type, "Park");
            assert_eq!(p.amenities, vec!["Park".to_string(), "Playground".to_string()]);
            assert_eq!(p.base.rating, Some(4.5));
            assert_eq!(p.base.source_api, "foursquare");
            assert_eq!(p.base.api_specific_id, "p1");
            assert_eq!(p.base.description, "Park, Playground");
        }
        other => panic!("expected a park, got {other:?}"),
    }
}

#[test]
fn test_park_amenities_keep_every_category_label() {
    let place = ProviderPlace::new("p2", "Harbor Green")
        .with_category(fsq(16032, "Park"))
        .with_category(fsq(13032, "Café"))
        .with_category(fsq(17069, "Gift Shop"))
        .with_category(fsq(17000, "  "))
        .with_coordinates(40.7, -74.01);

    let item = classifier().classify(&place, "foursquare").unwrap();
    let DomainItem::Park(p) = item else {
        panic!("expected a park");
    };
    assert_eq!(p.park_type, "Park");
    assert_eq!(
        p.amenities,
        vec!["Park".to_string(), "Café".to_string(), "Gift Shop".to_string()]
    );
    assert!(p.amenities.iter().all(|a| !a.trim().is_empty()));
}

#[test]
fn test_restaurant_fields() {
    let mut place = ProviderPlace::new("r1", "Luigi's")
        .with_category(fsq(13065, "Italian Restaurant"))
        .with_coordinates(40.7, -74.0);
    place.price = Some(ProviderPrice::Level(2));
    place.description = Some("Family-run trattoria".into());
    place.website = Some("https://luigis.example".into());
    place.photos = vec![PhotoRef::Template {
        prefix: "https://img.example/".into(),
        suffix: "/r1.jpg".into(),
    }];
    place.address = AddressParts {
        street: Some("1 Main St".into()),
        city: Some("New York".into()),
        state: None,
        postcode: Some("10001".into()),
        country: Some("US".into()),
    };

    let item = classifier().classify(&place, "foursquare").unwrap();
    let DomainItem::Restaurant(r) = item else {
        panic!("expected a restaurant");
    };
    assert_eq!(r.cuisine_type, "Italian Restaurant");
    assert_eq!(r.price_range, Some(PriceTier::Two));
    assert_eq!(r.base.description, "Family-run trattoria");
    assert_eq!(r.base.image_url.as_deref(), Some("https://img.example/400x400/r1.jpg"));
    assert_eq!(r.base.location.street.as_deref(), Some("1 Main St"));
    assert_eq!(r.base.location.zipcode.as_deref(), Some("10001"));
    assert!(r.base.location.state.is_none());
    assert!(r.base.rating.is_none());
}

#[test]
fn test_photo_size_is_configurable() {
    let mut place = park();
    place.photos = vec![PhotoRef::Template {
        prefix: "https://img/".into(),
        suffix: "/a.jpg".into(),
    }];
    let item = classifier().with_photo_size("original").classify(&place, "foursquare").unwrap();
    assert_eq!(item.base().image_url.as_deref(), Some("https://img/original/a.jpg"));
}

#[test]
fn test_event_uses_supplied_time() {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 18, 30, 0).unwrap();
    let place = ProviderPlace::new("e1", "Blue Note")
        .with_category(fsq(10032, "Jazz Club"))
        .with_coordinates(40.73, -74.0);

    match classifier().evaluate_at(&place, "foursquare", now) {
        Classification::Classified(DomainItem::Event(e)) => {
            assert_eq!(e.event_type, "Jazz Club");
            assert_eq!(e.start_date, now);
        }
        other => panic!("expected an event, got {other:?}"),
    }
}

#[test]
fn test_event_rules_take_priority_within_a_category() {
    let text = r#"
        version = 1
        [event]
        label = "Event Venue"
        ids = [13003]
        [park]
        label = "Park"
        [restaurant]
        label = "Restaurant"
        ids = [13000]
    "#;
    let classifier = Classifier::new(CategoryRules::from_toml_str(text).unwrap());
    let place = ProviderPlace::new("b1", "Beer Hall")
        .with_category(fsq(13003, "Bar"))
        .with_coordinates(1.0, 2.0);

    assert_eq!(
        classifier.classify(&place, "foursquare").unwrap().kind(),
        local_places_core::types::ItemKind::Event
    );
}

#[test]
fn test_unclassified_reasons() {
    let c = classifier();

    let bare = ProviderPlace::new("x", "Nothing").with_coordinates(1.0, 1.0);
    assert_eq!(
        c.evaluate(&bare, "foursquare"),
        Classification::Unclassified(UnclassifiedReason::NoCategories)
    );

    let shop = ProviderPlace::new("s", "Gift Shop")
        .with_category(fsq(17069, "Gift Shop"))
        .with_coordinates(1.0, 1.0);
    assert_eq!(
        c.evaluate(&shop, "foursquare"),
        Classification::Unclassified(UnclassifiedReason::UnrecognizedCategories)
    );

    let nowhere = ProviderPlace::new("n", "Ghost Park").with_category(fsq(16032, "Park"));
    assert_eq!(
        c.evaluate(&nowhere, "foursquare"),
        Classification::Unclassified(UnclassifiedReason::MissingCoordinates)
    );
}

#[test]
fn test_classify_all_drops_unknown_and_keeps_order() {
    let shop = ProviderPlace::new("s1", "Gift Shop")
        .with_category(fsq(17069, "Gift Shop"))
        .with_coordinates(1.0, 1.0);
    let pizza = ProviderPlace::new("r2", "Slice")
        .with_category(fsq(13064, "Pizzeria"))
        .with_coordinates(1.0, 2.0);

    let response = ProviderResponse::new("foursquare", vec![pizza, shop, park()]);
    let items = classifier().classify_all(&response);

    let ids: Vec<&str> = items.iter().map(|i| i.id()).collect();
    assert_eq!(ids, vec!["r2", "p1"]);
    assert_eq!(response.total, 3);
}

#[test]
fn test_yelp_aliases_classify() {
    let mut place = ProviderPlace::new("y1", "Dolores Park")
        .with_category(PlaceCategory::new(CategoryKey::alias("parks"), "Parks"))
        .with_coordinates(37.76, -122.43)
        .with_rating(4.5, 5.0);
    place.price = Some(ProviderPrice::Symbol("$".into()));

    let item = classifier().classify(&place, "yelp").unwrap();
    let json = serde_json::to_value(&item).unwrap();
    assert_eq!(json["type"], "Park");
    assert_eq!(json["parkType"], "Parks");
    assert_eq!(json["rating"], 4.5);
    assert_eq!(json["sourceApi"], "yelp");
}
