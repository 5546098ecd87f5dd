pub mod notifier;
pub mod subscription;

pub use notifier::ChangeNotifier;
pub use subscription::SubscriptionId;
