// Pure functions: oxygen arithmetic, setpoint clamping and status banding.
// Nothing here touches session state or randomness.

use log::debug;

use crate::constants::*;
use crate::types::*;

/// Oxygen content (mL O2/dL) of one blood sample.
///
/// `1.34 * Hb * (SO2 / 100) + 0.003 * pO2`. Saturation is a percentage.
/// Inputs are not range-checked; negative or absurd values pass straight through.
pub fn oxygen_content(hemoglobin: f64, saturation_percent: f64, partial_pressure: f64) -> f64 {
    HB_OXYGEN_CAPACITY * hemoglobin * (saturation_percent / 100.0)
        + DISSOLVED_OXYGEN_COEFFICIENT * partial_pressure
}

pub fn reading_content(reading: &BloodGasReading) -> f64 {
    oxygen_content(
        reading.hemoglobin,
        reading.saturation,
        reading.partial_pressure,
    )
}

/// VO2ren (mL/min): `flow * (AOC - RVOC)`. Negative when venous exceeds arterial.
pub fn consumption(flow_rate: f64, arterial_content: f64, venous_content: f64) -> f64 {
    flow_rate * (arterial_content - venous_content)
}

/// Build the record for one sampling event.
pub fn derive_record(
    timestamp: String,
    arterial: &BloodGasReading,
    venous: &BloodGasReading,
    flow_rate: f64,
) -> MetricRecord {
    let arterial_content = reading_content(arterial);
    let venous_content = reading_content(venous);
    MetricRecord {
        timestamp,
        consumption: consumption(flow_rate, arterial_content, venous_content),
        arterial_content,
        venous_content,
    }
}

/// Move the pressure setpoint by `delta`, clamping at the limits.
pub fn adjust_pressure(setpoints: Setpoints, delta: i64) -> Setpoints {
    let requested = setpoints.pressure().saturating_add(delta);
    let next = Setpoints::new(requested, setpoints.temperature());
    if next.pressure() != requested {
        debug!(
            "pressure request {} clamped to {} mmHg",
            requested,
            next.pressure()
        );
    }
    next
}

/// Move the temperature setpoint by `delta`, clamping at the limits.
pub fn adjust_temperature(setpoints: Setpoints, delta: i64) -> Setpoints {
    let requested = setpoints.temperature().saturating_add(delta);
    let next = Setpoints::new(setpoints.pressure(), requested);
    if next.temperature() != requested {
        debug!(
            "temperature request {} clamped to {} °C",
            requested,
            next.temperature()
        );
    }
    next
}

pub fn temperature_status(temperature: Celsius) -> StatusLevel {
    if (TEMPERATURE_NORMAL_LOW..=TEMPERATURE_NORMAL_HIGH).contains(&temperature) {
        StatusLevel::Normal
    } else if temperature < TEMPERATURE_NORMAL_LOW {
        StatusLevel::Warning
    } else {
        StatusLevel::Critical
    }
}

pub fn pressure_status(pressure: MmHg) -> StatusLevel {
    if (PRESSURE_NORMAL_LOW..=PRESSURE_NORMAL_HIGH).contains(&pressure) {
        StatusLevel::Normal
    } else if (PRESSURE_WARNING_LOW..PRESSURE_NORMAL_LOW).contains(&pressure) {
        StatusLevel::Warning
    } else {
        StatusLevel::Critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn content_matches_reference_values() {
        assert!(approx(oxygen_content(14.0, 98.0, 90.0), 18.6548));
        assert!(approx(oxygen_content(13.0, 75.0, 40.0), 13.185));
    }

    #[test]
    fn content_passes_negative_inputs_through() {
        assert!(approx(oxygen_content(-1.0, 100.0, 0.0), -1.34));
    }

    #[test]
    fn consumption_sign_follows_content_difference() {
        assert_eq!(consumption(400.0, 15.0, 15.0), 0.0);
        assert!(consumption(400.0, 18.0, 13.0) > 0.0);
        assert!(consumption(400.0, 13.0, 18.0) < 0.0);
    }

    #[test]
    fn derive_record_reference_scenario() {
        let arterial = BloodGasReading {
            hemoglobin: 14.0,
            saturation: 98.0,
            partial_pressure: 90.0,
        };
        let venous = BloodGasReading {
            hemoglobin: 13.0,
            saturation: 75.0,
            partial_pressure: 40.0,
        };
        let rec = derive_record("08:30:00".into(), &arterial, &venous, 400.0);
        assert!(approx(rec.arterial_content, 18.6548));
        assert!(approx(rec.venous_content, 13.185));
        assert!((rec.consumption - 2187.92).abs() < 1e-6);
    }

    #[test]
    fn pressure_clamps_at_both_ends() {
        let low = Setpoints::new(PRESSURE_MIN, 37);
        assert_eq!(adjust_pressure(low, -1).pressure(), PRESSURE_MIN);
        let high = Setpoints::new(PRESSURE_MAX, 37);
        assert_eq!(adjust_pressure(high, 1).pressure(), PRESSURE_MAX);
        assert_eq!(adjust_pressure(Setpoints::default(), 1).pressure(), 101);
    }

    #[test]
    fn temperature_clamps_at_both_ends() {
        let low = Setpoints::new(100, TEMPERATURE_MIN);
        assert_eq!(adjust_temperature(low, -1).temperature(), TEMPERATURE_MIN);
        let high = Setpoints::new(100, TEMPERATURE_MAX);
        assert_eq!(adjust_temperature(high, 1).temperature(), TEMPERATURE_MAX);
    }

    #[test]
    fn adjusting_one_setpoint_leaves_the_other() {
        let sp = Setpoints::new(120, 33);
        assert_eq!(adjust_pressure(sp, 5).temperature(), 33);
        assert_eq!(adjust_temperature(sp, 2).pressure(), 120);
    }

    #[test]
    fn status_bands() {
        assert_eq!(temperature_status(37), StatusLevel::Normal);
        assert_eq!(temperature_status(35), StatusLevel::Normal);
        assert_eq!(temperature_status(34), StatusLevel::Warning);
        assert_eq!(temperature_status(39), StatusLevel::Critical);

        assert_eq!(pressure_status(70), StatusLevel::Normal);
        assert_eq!(pressure_status(100), StatusLevel::Normal);
        assert_eq!(pressure_status(65), StatusLevel::Warning);
        assert_eq!(pressure_status(59), StatusLevel::Critical);
        assert_eq!(pressure_status(101), StatusLevel::Critical);
    }
}
