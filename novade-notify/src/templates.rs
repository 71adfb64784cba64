//! Ready-made notifications for the application's categories.
//!
//! Every template sets `metadata.category` so presentation preferences can
//! mute it, and points `action_url` at the page that handles it. Pass the
//! result to [`crate::NotificationService::send`].

use serde_json::json;

use crate::preferences::NotificationCategory;
use crate::types::{NotificationInput, NotificationType};

fn categorized(
    kind: NotificationType,
    category: NotificationCategory,
    title: impl Into<String>,
    message: impl Into<String>,
) -> NotificationInput {
    NotificationInput::new(kind, title, message)
        .with_metadata(json!({ "category": category.as_str() }))
}

/// Merges extra keys into the metadata object built by [`categorized`].
fn with_details(mut input: NotificationInput, details: serde_json::Value) -> NotificationInput {
    if let (Some(serde_json::Value::Object(meta)), serde_json::Value::Object(extra)) =
        (input.metadata.as_mut(), details)
    {
        meta.extend(extra);
    }
    input
}

pub mod system {
    use super::*;

    pub fn maintenance(message: impl Into<String>) -> NotificationInput {
        categorized(
            NotificationType::Warning,
            NotificationCategory::System,
            "System maintenance",
            message,
        )
    }

    pub fn update(version: &str) -> NotificationInput {
        let input = categorized(
            NotificationType::Info,
            NotificationCategory::System,
            "Update available",
            format!("Version {} is available", version),
        )
        .with_action_url("/admin/updates");
        with_details(input, json!({ "version": version }))
    }
}

pub mod bookings {
    use super::*;

    fn booking(
        kind: NotificationType,
        title: &str,
        message: String,
        booking_id: &str,
        destination: &str,
    ) -> NotificationInput {
        let input = categorized(kind, NotificationCategory::Bookings, title, message)
            .with_action_url(format!("/travel/bookings/{}", booking_id));
        with_details(input, json!({ "booking_id": booking_id, "destination": destination }))
    }

    pub fn confirmed(booking_id: &str, destination: &str) -> NotificationInput {
        booking(
            NotificationType::Success,
            "Booking confirmed",
            format!("Your trip to {} is confirmed", destination),
            booking_id,
            destination,
        )
    }

    pub fn cancelled(booking_id: &str, destination: &str) -> NotificationInput {
        booking(
            NotificationType::Error,
            "Booking cancelled",
            format!("Your trip to {} was cancelled", destination),
            booking_id,
            destination,
        )
    }

    pub fn reminder(booking_id: &str, destination: &str, days_left: u32) -> NotificationInput {
        let input = booking(
            NotificationType::Info,
            "Trip reminder",
            format!("Your trip to {} starts in {} days", destination, days_left),
            booking_id,
            destination,
        );
        with_details(input, json!({ "days_left": days_left }))
    }
}

pub mod payments {
    use super::*;

    fn payment(
        kind: NotificationType,
        title: &str,
        message: String,
        amount: f64,
        description: &str,
    ) -> NotificationInput {
        let input = categorized(kind, NotificationCategory::Payments, title, message)
            .with_action_url("/finance/transactions");
        with_details(input, json!({ "amount": amount, "description": description }))
    }

    pub fn successful(amount: f64, description: &str) -> NotificationInput {
        payment(
            NotificationType::Success,
            "Payment confirmed",
            format!("Payment of {:.2} completed: {}", amount, description),
            amount,
            description,
        )
    }

    pub fn failed(amount: f64, description: &str) -> NotificationInput {
        payment(
            NotificationType::Error,
            "Payment failed",
            format!("Payment of {:.2} failed: {}", amount, description),
            amount,
            description,
        )
    }

    pub fn refund(amount: f64, description: &str) -> NotificationInput {
        payment(
            NotificationType::Success,
            "Refund processed",
            format!("Refund of {:.2}: {}", amount, description),
            amount,
            description,
        )
    }
}

pub mod security {
    use super::*;

    pub fn login(location: &str, device: &str) -> NotificationInput {
        let input = categorized(
            NotificationType::Info,
            NotificationCategory::Security,
            "New sign-in detected",
            format!("Signed in from {} ({})", location, device),
        )
        .with_action_url("/security/activity");
        with_details(input, json!({ "location": location, "device": device }))
    }

    pub fn password_changed() -> NotificationInput {
        categorized(
            NotificationType::Success,
            NotificationCategory::Security,
            "Password changed",
            "Your password was changed successfully",
        )
        .with_action_url("/security/settings")
    }

    pub fn suspicious_activity(activity: &str) -> NotificationInput {
        let input = categorized(
            NotificationType::Warning,
            NotificationCategory::Security,
            "Suspicious activity",
            format!("Suspicious activity detected: {}", activity),
        )
        .with_action_url("/security/activity");
        with_details(input, json!({ "activity": activity }))
    }
}

pub mod marketing {
    use super::*;

    pub fn promotion(title: &str, description: &str, discount: &str) -> NotificationInput {
        let input = categorized(
            NotificationType::Info,
            NotificationCategory::Marketing,
            title,
            format!("{} - {} off", description, discount),
        )
        .with_action_url("/marketing/promotions");
        with_details(input, json!({ "discount": discount }))
    }

    pub fn loyalty_points(points: u32, reason: &str) -> NotificationInput {
        let input = categorized(
            NotificationType::Success,
            NotificationCategory::Marketing,
            "Points added",
            format!("+{} points added: {}", points, reason),
        )
        .with_action_url("/loyalty");
        with_details(input, json!({ "points": points, "reason": reason }))
    }
}
