//! Physical quantities used in jet selections and configuration files.
//!
//! Energies (and, in natural units, momenta and masses) are `uom` `Energy`
//! quantities, so that configuration files can say `"30 GeV"` or `"1 TeV"`
//! and mean it.

pub mod plain;

pub use uom;
pub use uom::si::f32::Energy;

/// Masses are expressed in energy units (`c = 1`).
pub type Mass = Energy;

mod units {
  pub use uom::si::energy::{megaelectronvolt, gigaelectronvolt, teraelectronvolt};
}

// Making values from float literals seems to be very long-winded, so provide
// some pithily-named convenience constructors.

/// Generate a function called NAME which returns QUANTITY by interpreting its
/// argument as UNIT
///
/// wrap!(NAME QUANTITY UNIT);
macro_rules! wrap {
  ($name:ident $quantity:ident $unit:ident ) => {
    pub fn $name(x: f32) -> $quantity { $quantity::new::<units::$unit>(x) }
  };
}

wrap!(mev Energy megaelectronvolt);
wrap!(gev Energy gigaelectronvolt);
wrap!(tev Energy teraelectronvolt);

// Reverse direction of the above
pub fn gev_(x: Energy) -> f32 { x.get::<units::gigaelectronvolt>() }

#[macro_export]
macro_rules! assert_uom_eq {
  ($unit:ident, $lhs:expr, $rhs:expr, $algo:ident <= $tol:expr) => {
    float_eq::assert_float_eq!($lhs.get::<$unit>(), $rhs.get::<$unit>(), $algo <= $tol)
  };
}

#[cfg(test)]
mod tests {
  use super::*;
  use uom::si::energy::gigaelectronvolt;

  #[test]
  fn energies_sum_across_prefixes() {
    let v = vec![gev(1.0), mev(500.0), tev(0.001)];
    let total: Energy = v.into_iter().fold(gev(0.0), |a, b| a + b);
    assert_uom_eq!(gigaelectronvolt, total, gev(2.5), r2nd <= 1e-5);
  }

  #[test]
  fn parse_energy_with_units() -> Result<(), Box<dyn std::error::Error>> {
    let e: Energy = "30 GeV".parse()?;
    assert_uom_eq!(gigaelectronvolt, e, gev(30.0), r2nd <= 1e-5);
    let e: Energy = "1 TeV".parse()?;
    assert_uom_eq!(gigaelectronvolt, e, gev(1000.0), r2nd <= 1e-5);
    Ok(())
  }

  #[test]
  fn reverse_conversion() {
    float_eq::assert_float_eq!(gev_(gev(150.0)), 150.0, r2nd <= 1e-5);
    float_eq::assert_float_eq!(gev_(tev(0.25)), 250.0, r2nd <= 1e-5);
  }
}
