//! Election result tallying: balanced per-category result indices, an
//! aggregation session fed by registry snapshots and single votes, and the
//! reporting built on top of them.

pub mod formats;
pub mod index;
pub mod model;
pub mod reports;
pub mod tally;
pub mod util;

pub use index::{IndexError, ResultIndex, TraversalOrder};
pub use model::{Category, ResultRecord};
pub use tally::{PercentageRefresh, RegionCollisionPolicy, TallyError, TallyOptions, TallySession};
