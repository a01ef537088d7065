//! Screen text catalogue.
//!
//! Prompt wording follows the production menus; the resolver and trigger own
//! *which* screen appears, this module owns what each one says.

use crate::money::format_kes;
use crate::types::{Screen, Tenant};

pub fn main_menu(tenant: &Tenant) -> Screen {
    Screen::prompt(format!(
        "Welcome, {}. {}, {}\n\n1. Check dues\n2. Pay rent\n0. Exit",
        tenant.name, tenant.unit, tenant.property
    ))
}

pub fn register_prompt() -> Screen {
    Screen::prompt("Welcome to RentPay USSD\n\n1. Register as tenant\n0. Exit")
}

pub fn dues(tenant: &Tenant) -> Screen {
    Screen::prompt(format!(
        "Your rent details:\n\nRent due: KES {}\nLast payment: {}\n\n1. Back to main menu\n0. Exit",
        format_kes(tenant.rent_due),
        tenant.last_payment
    ))
}

pub fn confirm_pay(tenant: &Tenant) -> Screen {
    Screen::prompt(format!(
        "Pay Full Rent\n\nAmount to pay: KES {}\n\n1. Confirm payment\n2. Back to main menu\n0. Exit",
        format_kes(tenant.rent_due)
    ))
}

pub fn pay_method() -> Screen {
    Screen::prompt(
        "Payment Method:\n\n1. M-Pesa\n2. Airtel Money\n#. Back to payment menu\n0. Exit",
    )
}

pub fn airtel_stub() -> Screen {
    Screen::prompt(
        "Airtel Money Payment\n\nAirtel Money integration coming soon!\n\n1. Back to payment methods\n#. Back to payment menu\n0. Exit",
    )
}

pub fn stk_sent() -> Screen {
    Screen::prompt(
        "M-Pesa STK Push Sent!\n\nCheck your phone for M-Pesa prompt\nEnter PIN to complete payment\n\n1. Payment completed\n#. Back to payment methods\n0. Exit",
    )
}

pub fn stk_rejected(reason: &str) -> Screen {
    Screen::terminal(format!("STK push failed: {reason}"))
}

pub fn payment_failed() -> Screen {
    Screen::terminal("Payment could not be initiated. Please try again later.")
}

pub fn payment_unavailable() -> Screen {
    Screen::terminal("M-Pesa service is not available. Please contact support.")
}

pub fn payment_done() -> Screen {
    Screen::terminal(
        "Payment successful! You will receive an SMS confirmation. Thank you for using RentPay USSD.",
    )
}

pub fn exit() -> Screen {
    Screen::terminal("Thank you for using RentPay USSD. Goodbye!")
}

pub fn session_expired() -> Screen {
    Screen::terminal("Session expired. Please dial again.")
}

pub fn invalid_choice() -> Screen {
    Screen::terminal("Invalid choice. Please dial again.")
}

pub fn invalid_back() -> Screen {
    Screen::terminal("Invalid back navigation. Please dial again.")
}
