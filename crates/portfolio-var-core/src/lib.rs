//! Portfolio Value-at-Risk for a basket of equities.
//!
//! Adjusted-close prices go through [`returns::ReturnsPipeline`] to produce
//! per-asset log returns and a rolling portfolio return series; the
//! [`var`] estimators turn those into historical and parametric VaR.
//! [`engine::compute_var`] runs the whole request and returns a
//! [`result_set::ResultSet`].

pub mod distribution;
pub mod engine;
pub mod error;
pub mod history;
pub mod result_set;
pub mod returns;
pub mod types;
pub mod var;
pub mod weights;

pub use engine::{compute_var, InMemoryPriceSource, PriceSource, VarRequest};
pub use error::{ErrorKind, PortfolioVarError};
pub use history::{ResultHistory, SharedHistory};
pub use result_set::{ResultSet, ResultSummary};
pub use types::*;
pub use var::{VarEstimate, VarMethod};
pub use weights::Weights;

/// Standard result type for all portfolio-var operations
pub type PortfolioVarResult<T> = Result<T, PortfolioVarError>;
