use macro_const::macro_const;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

macro_const! {
    const PLD_DOC: &str = r"
Regressor basis settings of pixel-level decorrelation

First-order regressors are pixel fluxes divided by the total flux of the cadence, they are
projected onto `first_order_components` leading principal components. With the `Second`
order, products of all pairs of first-order regressors are added after projecting them onto
`second_order_components` leading principal components. Component counts larger than the
number of available regressors are reduced to that number.
";
}

/// Highest order of pixel-flux products used as regressors
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PldOrder {
    First,
    #[default]
    Second,
}

#[doc = PLD_DOC!()]
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct PldConfig {
    pub first_order_components: usize,
    pub second_order_components: usize,
    pub order: PldOrder,
}

impl PldConfig {
    pub const fn doc() -> &'static str {
        PLD_DOC
    }

    pub const fn default_first_order_components() -> usize {
        20
    }

    pub const fn default_second_order_components() -> usize {
        10
    }

    /// First-order-only basis with default component count
    pub fn first_order() -> Self {
        Self {
            order: PldOrder::First,
            ..Self::default()
        }
    }
}

impl Default for PldConfig {
    fn default() -> Self {
        Self {
            first_order_components: Self::default_first_order_components(),
            second_order_components: Self::default_second_order_components(),
            order: PldOrder::default(),
        }
    }
}

/// Settings of [`ApertureFit`](crate::ApertureFit)
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct ApertureFitConfig {
    pub pld: PldConfig,
    /// Depth the transit curve was injected with, it turns the curve into a unit-depth shape
    pub reference_depth: f64,
}

impl ApertureFitConfig {
    pub const fn default_reference_depth() -> f64 {
        0.01
    }
}

impl Default for ApertureFitConfig {
    fn default() -> Self {
        Self {
            pld: PldConfig::default(),
            reference_depth: Self::default_reference_depth(),
        }
    }
}
