pub mod telegram;

pub use telegram::{NotifyError, TelegramNotifier};
