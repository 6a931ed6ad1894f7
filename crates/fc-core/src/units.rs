// fc-core/src/units.rs

use uom::si::f64::{Energy as UomEnergy, Power as UomPower, Ratio as UomRatio};

// Public canonical unit types (SI, f64)
pub type Energy = UomEnergy;
pub type Power = UomPower;
pub type Ratio = UomRatio;

#[inline]
pub fn j(v: f64) -> Energy {
    use uom::si::energy::joule;
    Energy::new::<joule>(v)
}

#[inline]
pub fn kwh(v: f64) -> Energy {
    use uom::si::energy::kilowatt_hour;
    Energy::new::<kilowatt_hour>(v)
}

#[inline]
pub fn gj(v: f64) -> Energy {
    use uom::si::energy::gigajoule;
    Energy::new::<gigajoule>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}
