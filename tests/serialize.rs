#![cfg(feature = "serde")]

use nalgebra::{Vector2, Vector3};
use orthtree::prelude::*;

#[test]
fn test_bounding_volume_serialization() {
    let volume = BoundingVolume::new(Vector3::new(0., 1., 2.), Vector3::new(3., 4., 5.));
    let json = serde_json::to_string(&volume).unwrap();
    assert_eq!(json, r#"{"lower":[0.0,1.0,2.0],"upper":[3.0,4.0,5.0]}"#);

    let restored: BoundingVolume3D<f64> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, volume);
}

#[test]
fn test_invalid_bounding_volume_is_rejected() {
    let inverted = r#"{"lower":[2.0,0.0],"upper":[1.0,1.0]}"#;
    assert!(serde_json::from_str::<BoundingVolume2D<f64>>(inverted).is_err());

    let short = r#"{"lower":[0.0,0.0],"upper":[1.0,1.0]}"#;
    assert!(serde_json::from_str::<BoundingVolume3D<f64>>(short).is_err());
}

#[test]
fn test_configuration_serialization() {
    let domain = BoundingVolume::new(Vector2::new(0., 0.), Vector2::new(64., 64.));
    let configuration = TreeConfiguration::new(domain.clone())
        .with_minimum_size(Vector2::new(4., 8.))
        .with_trim_on_remove(true);
    let json = serde_json::to_string_pretty(&configuration).unwrap();
    let restored: TreeConfiguration<f64, nalgebra::Const<2>> =
        serde_json::from_str(&json).unwrap();
    assert_eq!(restored, configuration);

    // omitted fields fall back to the defaults
    let minimal = r#"{"volume":{"lower":[0.0,0.0],"upper":[64.0,64.0]}}"#;
    let restored: TreeConfiguration<f64, nalgebra::Const<2>> =
        serde_json::from_str(minimal).unwrap();
    assert_eq!(restored, TreeConfiguration::new(domain));

    let invalid = r#"{"volume":{"lower":[0.0,0.0],"upper":[64.0,64.0]},"minimum_size":[0.0,1.0]}"#;
    assert!(serde_json::from_str::<TreeConfiguration<f64, nalgebra::Const<2>>>(invalid).is_err());
}
