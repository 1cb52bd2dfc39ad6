pub mod account;
pub mod cert;
pub mod daemon;
pub mod info;
pub mod obtain;
pub mod order;
pub mod renew;
pub mod serve;

pub use account::{handle_deactivate, handle_register, handle_rotate_key, handle_update};
pub use cert::{handle_cert_list, handle_cert_revoke};
pub use daemon::handle_daemon;
pub use info::handle_info;
pub use obtain::handle_obtain;
pub use order::{handle_order_list, handle_order_show};
pub use renew::handle_renew;
pub use serve::handle_serve;
