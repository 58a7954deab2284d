//! Vehicle record fixtures.

use crate::contracts::{expect_type, should_be, to_tag};
use crate::core::{fields_from_json, Fields, TagSet, ValueKind};
use crate::record::RecordType;

/// A small family of vehicle record types.
///
/// `wheeler` is extensible and converts `vehicle_type` from its value string;
/// `car` and `bicycle` are closed types discriminated by a constant tag;
/// `truck` extends `wheeler` and stays extensible.
#[derive(Debug, Clone)]
pub struct VehicleFixture {
    /// `WheelerType("bicycle", "car", "truck")`.
    pub wheeler_type: TagSet,
    /// `BicycleBreakType("disk", "rim")`.
    pub break_type: TagSet,
    /// Extensible base vehicle.
    pub wheeler: RecordType,
    /// Closed car.
    pub car: RecordType,
    /// Closed bicycle.
    pub bicycle: RecordType,
    /// Extensible truck derived from `wheeler`.
    pub truck: RecordType,
}

impl VehicleFixture {
    /// Builds the fixture types.
    #[must_use]
    pub fn new() -> Self {
        let wheeler_type = TagSet::new(
            "WheelerType",
            [("Bicycle", "bicycle"), ("Car", "car"), ("Truck", "truck")],
        );
        let break_type = TagSet::new("BicycleBreakType", [("Disk", "disk"), ("Rim", "rim")]);

        let wheeler = RecordType::extensible("Wheeler")
            .field("vehicle_type", to_tag(&wheeler_type))
            .field("model", ValueKind::Str)
            .field("wheels", ValueKind::Int)
            .build();
        let car = RecordType::closed("Car")
            .field("vehicle_type", wheeler_type.tag("Car"))
            .field("model", ValueKind::Str)
            .field("wheels", ValueKind::Int)
            .field("doors", expect_type(ValueKind::Int))
            .build();
        let bicycle = RecordType::closed("Bicycle")
            .field("vehicle_type", should_be(wheeler_type.tag("Bicycle")))
            .field("model", ValueKind::Str)
            .field("wheels", ValueKind::Int)
            .field("breaks", to_tag(&break_type))
            .build();
        let truck = wheeler
            .subtype("Truck")
            .field("vehicle_type", wheeler_type.tag("Truck"))
            .field("capacity", ValueKind::Float)
            .build();

        Self {
            wheeler_type,
            break_type,
            wheeler,
            car,
            bicycle,
            truck,
        }
    }

    /// Input describing a car, including the undeclared `doors` key.
    #[must_use]
    pub fn car_data() -> Fields {
        fields_from_json(serde_json::json!({
            "vehicle_type": "car", "model": "choo", "wheels": 4, "doors": 5
        }))
    }

    /// Input describing a bicycle.
    #[must_use]
    pub fn bicycle_data() -> Fields {
        fields_from_json(serde_json::json!({
            "vehicle_type": "bicycle", "model": "DIY", "wheels": 2, "breaks": "disk"
        }))
    }

    /// Input describing a truck, including the undeclared `power` key.
    #[must_use]
    pub fn truck_data() -> Fields {
        fields_from_json(serde_json::json!({
            "vehicle_type": "truck", "model": "DIY", "wheels": 8, "capacity": 20.5, "power": 400
        }))
    }
}

impl Default for VehicleFixture {
    fn default() -> Self {
        Self::new()
    }
}
