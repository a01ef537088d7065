//! The session resolver: (phone, trail) -> screen.

use crate::menu::{self, NodeId, Walk};
use crate::payment::{self, PaymentGateway};
use crate::screens;
use crate::store::TenantStore;
use crate::types::{Screen, Tenant};
use std::sync::Arc;
use tracing::{info, warn};

/// Stateless USSD session resolver over the fixed menu tree.
///
/// Holds only shared read-only collaborators, so concurrent requests are
/// fully independent. `resolve` is pure given the tenant lookup result,
/// except for the single delegated payment call at the push node.
pub struct Resolver {
    store: Arc<dyn TenantStore>,
    /// `None` when payment credentials are not configured; the push node
    /// then degrades to a service-unavailable screen.
    gateway: Option<Arc<dyn PaymentGateway>>,
}

impl Resolver {
    pub fn new(store: Arc<dyn TenantStore>, gateway: Option<Arc<dyn PaymentGateway>>) -> Self {
        Self { store, gateway }
    }

    pub fn gateway_label(&self) -> &'static str {
        self.gateway.as_ref().map(|g| g.label()).unwrap_or("none")
    }

    /// Resolves the full input trail to the next screen. Total: every trail
    /// maps to some screen, malformed ones to the invalid-choice terminal.
    pub async fn resolve(&self, phone: &str, trail: &str) -> Screen {
        match menu::walk(trail) {
            Walk::Invalid => screens::invalid_choice(),
            Walk::InvalidBack => screens::invalid_back(),
            Walk::Back(target) => self.render_static(phone, target, false),
            Walk::Node(NodeId::MpesaPush) => self.initiate_payment(phone).await,
            Walk::Node(node) => self.render_static(phone, node, trail.is_empty()),
        }
    }

    /// Renders every node except the push node, which has the one side
    /// effect. `fresh` is true only for the empty trail: the root greets
    /// unknown subscribers with the registration prompt there, while every
    /// regeneration of the main menu treats them as an expired session.
    fn render_static(&self, phone: &str, node: NodeId, fresh: bool) -> Screen {
        match node {
            NodeId::Main => match self.store.lookup(phone) {
                Some(tenant) => screens::main_menu(&tenant),
                None if fresh => screens::register_prompt(),
                None => screens::session_expired(),
            },
            NodeId::Dues => self.with_tenant(phone, |t| screens::dues(&t)),
            NodeId::ConfirmPay => self.with_tenant(phone, |t| screens::confirm_pay(&t)),
            NodeId::PayMethod => screens::pay_method(),
            NodeId::AirtelStub => screens::airtel_stub(),
            NodeId::PaymentDone => screens::payment_done(),
            NodeId::Exit => screens::exit(),
            // Reached only through `resolve`, which routes the push node to
            // `initiate_payment`.
            NodeId::MpesaPush => screens::invalid_choice(),
        }
    }

    fn with_tenant(&self, phone: &str, render: impl FnOnce(Tenant) -> Screen) -> Screen {
        match self.store.lookup(phone) {
            Some(tenant) => render(tenant),
            None => screens::session_expired(),
        }
    }

    async fn initiate_payment(&self, phone: &str) -> Screen {
        let Some(tenant) = self.store.lookup(phone) else {
            return screens::session_expired();
        };
        let Some(gateway) = self.gateway.as_ref() else {
            warn!(phone, "push requested but no payment gateway is configured");
            return screens::payment_unavailable();
        };

        let request = payment::build_push_request(phone, &tenant);
        info!(
            trace_id = %request.trace_id,
            gateway = gateway.label(),
            amount = request.amount,
            account_ref = %request.account_ref,
            "initiating STK push"
        );
        let outcome = gateway.push_pay(request).await;
        payment::initiation_screen(&outcome)
    }
}
