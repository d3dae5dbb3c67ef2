mod model;
pub use self::model::*;
mod store;
pub use self::store::*;
mod links;
pub use self::links::*;
mod routes;
pub use self::routes::*;
