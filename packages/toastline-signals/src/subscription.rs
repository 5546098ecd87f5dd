use slotmap::new_key_type;

new_key_type! {
    /// Handle returned by [`ChangeNotifier::subscribe`](crate::ChangeNotifier::subscribe).
    pub struct SubscriptionId;
}
