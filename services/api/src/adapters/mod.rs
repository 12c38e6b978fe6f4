pub mod db;
pub mod email;
pub mod purchases;

pub use db::DbAdapter;
pub use email::{LogNotifier, SmtpNotifier};
pub use purchases::StaticPurchaseHistory;
