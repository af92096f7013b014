use perspective::{NetworkConfig, Scenario, TileNodeNetwork};
use validator::{Validate, ValidationErrors};

#[test]
fn test_config_validation() {
    let config = NetworkConfig {
        initial_capacity: 2_000_000, // invalid (too big)
        max_corner_valence: 4,       // invalid (a vertex can hold more)
        debug_colors: false,
    };

    let err = TileNodeNetwork::new(config).unwrap_err();
    let validation_errors = err.downcast::<ValidationErrors>().unwrap();
    let mut error_fields = validation_errors
        .errors()
        .keys()
        .copied()
        .collect::<Vec<&str>>();
    error_fields.sort_unstable();
    assert_eq!(
        error_fields,
        vec!["initial_capacity", "max_corner_valence"],
        "incorrect validation errors in {:#?}",
        validation_errors
    );
}

#[test]
fn test_scenario_validation() {
    let mut scenario = Scenario::default();
    assert!(scenario.validate().is_ok());

    scenario.config.max_corner_valence = 1000;
    let validation_errors = scenario.validate().unwrap_err();
    assert!(validation_errors.errors().contains_key("config"));
    assert!(scenario.run().is_err());
}
