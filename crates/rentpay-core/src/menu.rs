//! The fixed USSD menu tree.
//!
//! Each node carries its child edges keyed by keystroke and a back target, so
//! resolving a trail is a walk from the root rather than string-literal
//! branching. Every trail, however malformed, walks to *some* outcome.

/// Menu tree nodes, depth <= 4 from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeId {
    /// Trail `""`: personalized greeting (known tenant) or registration prompt.
    Main,
    /// Trail `1`: amount owed and last payment date.
    Dues,
    /// Trail `2`: full-amount payment confirmation.
    ConfirmPay,
    /// Trail `2*1`: payment method selection.
    PayMethod,
    /// Trail `2*1*1`: M-Pesa STK push initiation.
    MpesaPush,
    /// Trail `2*1*1*1`: terminal success acknowledgement.
    PaymentDone,
    /// Trail `2*1*2`: Airtel Money placeholder.
    AirtelStub,
    /// `0` from any menu.
    Exit,
}

impl NodeId {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::PaymentDone | Self::Exit)
    }

    /// Child edge for one keystroke. `None` means the keystroke is not a
    /// valid choice at this node.
    pub fn child(self, key: &str) -> Option<NodeId> {
        use NodeId::*;
        match (self, key) {
            (Main, "1") => Some(Dues),
            (Main, "2") => Some(ConfirmPay),
            (Dues, "1") => Some(Main),
            (ConfirmPay, "1") => Some(PayMethod),
            (ConfirmPay, "2") => Some(Main),
            (PayMethod, "1") => Some(MpesaPush),
            (PayMethod, "2") => Some(AirtelStub),
            (PayMethod, "3") => Some(ConfirmPay),
            (MpesaPush, "1") => Some(PaymentDone),
            (AirtelStub, "1") => Some(PayMethod),
            (node, "0") if !node.is_terminal() => Some(Exit),
            _ => None,
        }
    }

    /// Parent screen rendered when the subscriber presses `#` at this node.
    pub fn back_target(self) -> NodeId {
        use NodeId::*;
        match self {
            Main | Dues | ConfirmPay => Main,
            PayMethod | MpesaPush | AirtelStub => ConfirmPay,
            PaymentDone | Exit => Main,
        }
    }
}

/// Back navigation is supported only from these stripped trails. Deeper `#`
/// presses fall through to the invalid-back screen; this narrow behavior is
/// deliberate, not general tree backtracking.
const SUPPORTED_BACK_TRAILS: [&str; 4] = ["", "1", "2", "2*1"];

/// Outcome of walking a trail through the menu tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Trail reaches this node; render it.
    Node(NodeId),
    /// Trailing `#` from a supported node; render the parent.
    Back(NodeId),
    /// Trailing `#` from an unsupported node.
    InvalidBack,
    /// Trail does not correspond to any path from the root.
    Invalid,
}

/// Walks a raw gateway trail. Total: never fails, never panics.
pub fn walk(trail: &str) -> Walk {
    if let Some(stripped) = trail.strip_suffix('#') {
        if !SUPPORTED_BACK_TRAILS.contains(&stripped) {
            return Walk::InvalidBack;
        }
        let node = walk_segments(stripped).unwrap_or(NodeId::Main);
        return Walk::Back(node.back_target());
    }
    match walk_segments(trail) {
        Some(node) => Walk::Node(node),
        None => Walk::Invalid,
    }
}

fn walk_segments(trail: &str) -> Option<NodeId> {
    if trail.is_empty() {
        return Some(NodeId::Main);
    }
    let mut node = NodeId::Main;
    for key in trail.split('*') {
        node = node.child(key)?;
    }
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_trails_reach_their_nodes() {
        assert_eq!(walk(""), Walk::Node(NodeId::Main));
        assert_eq!(walk("1"), Walk::Node(NodeId::Dues));
        assert_eq!(walk("2"), Walk::Node(NodeId::ConfirmPay));
        assert_eq!(walk("2*1"), Walk::Node(NodeId::PayMethod));
        assert_eq!(walk("2*1*1"), Walk::Node(NodeId::MpesaPush));
        assert_eq!(walk("2*1*1*1"), Walk::Node(NodeId::PaymentDone));
        assert_eq!(walk("2*1*2"), Walk::Node(NodeId::AirtelStub));
        assert_eq!(walk("2*1*2*1"), Walk::Node(NodeId::PayMethod));
        assert_eq!(walk("0"), Walk::Node(NodeId::Exit));
    }

    #[test]
    fn re_render_trails_from_the_source_are_plain_edges() {
        assert_eq!(walk("1*1"), Walk::Node(NodeId::Main));
        assert_eq!(walk("2*2"), Walk::Node(NodeId::Main));
        assert_eq!(walk("2*1*3"), Walk::Node(NodeId::ConfirmPay));
    }

    #[test]
    fn zero_exits_from_every_menu() {
        for trail in ["0", "1*0", "2*0", "2*1*0", "2*1*1*0", "2*1*2*0"] {
            assert_eq!(walk(trail), Walk::Node(NodeId::Exit), "trail {trail}");
        }
    }

    #[test]
    fn back_navigation_covers_only_the_supported_parents() {
        assert_eq!(walk("#"), Walk::Back(NodeId::Main));
        assert_eq!(walk("1#"), Walk::Back(NodeId::Main));
        assert_eq!(walk("2#"), Walk::Back(NodeId::Main));
        assert_eq!(walk("2*1#"), Walk::Back(NodeId::ConfirmPay));
        assert_eq!(walk("2*1*1#"), Walk::InvalidBack);
        assert_eq!(walk("2*1*"), Walk::Invalid);
        assert_eq!(walk("nonsense#"), Walk::InvalidBack);
    }

    #[test]
    fn every_garbage_trail_walks_to_some_outcome() {
        for trail in [
            "9", "abc", "1*9", "2*7*4", "0*1", "**", "*", "2**1", "2*1*1*1*1", "##", "0#",
            "2*1*1*9",
        ] {
            match walk(trail) {
                Walk::Invalid | Walk::InvalidBack => {}
                other => panic!("trail {trail} unexpectedly resolved to {other:?}"),
            }
        }
    }
}
