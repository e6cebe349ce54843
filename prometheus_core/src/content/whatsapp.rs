//! WhatsApp hand-off links returned after a contact submission

use url::Url;

use super::{find_label, SiteContent};
use crate::models::Lead;

pub fn whatsapp_url(content: &SiteContent, message: &str) -> String {
    let base = content.brand.whatsapp_base_url.as_str();
    let phone: String = content
        .brand
        .whatsapp_number_link
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    let text = message.trim();

    let mut params: Vec<(&str, &str)> = Vec::new();
    if !phone.is_empty() {
        params.push(("phone", phone.as_str()));
    }
    if !text.is_empty() {
        params.push(("text", text));
    }

    if params.is_empty() {
        return base.to_string();
    }

    match Url::parse_with_params(base, &params) {
        Ok(url) => url.to_string(),
        Err(err) => {
            tracing::warn!("Invalid WhatsApp base URL {:?}: {}", base, err);
            base.to_string()
        }
    }
}

pub fn lead_whatsapp_message(content: &SiteContent, lead: &Lead) -> String {
    let reservation = &content.reservation;
    let brand = &content.brand;

    let intro = match lead.request_type.as_str() {
        "training-unlock" => &brand.payment_message,
        "slot" => &brand.booking_message,
        _ => &brand.quote_message,
    };

    [
        intro.clone(),
        format!("Nom: {}", lead.name),
        format!("Email: {}", lead.email),
        format!("WhatsApp: {}", lead.phone.as_deref().unwrap_or("non renseigne")),
        format!("Type: {}", find_label(&reservation.request_types, &lead.request_type)),
        format!("Service: {}", find_label(&reservation.services, &lead.service)),
        format!("Disponibilite: {}", find_label(&reservation.slots, &lead.preferred_slot)),
        format!("Besoin: {}", lead.goal),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn lead(request_type: &str) -> Lead {
        Lead {
            id: 1,
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            phone: None,
            request_type: request_type.to_string(),
            service: "excel".to_string(),
            preferred_slot: "morning".to_string(),
            goal: "Faire un budget".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_message_uses_labels_and_intro() {
        let content = SiteContent::baseline().unwrap();
        let message = lead_whatsapp_message(&content, &lead("slot"));

        assert!(message.starts_with(&content.brand.booking_message));
        assert!(message.contains("Service: Excel"));
        assert!(message.contains("Disponibilite: Matin"));
        assert!(message.contains("WhatsApp: non renseigne"));
    }

    #[test]
    fn test_url_encodes_phone_digits_and_text() {
        let content = SiteContent::baseline().unwrap();
        let url = whatsapp_url(&content, "Bonjour a tous\nNom: Ana");

        assert!(url.starts_with("https://api.whatsapp.com/send?phone=33600000000&text="));
        assert!(url.contains("Bonjour+a+tous%0ANom%3A+Ana"));
    }

    #[test]
    fn test_url_without_params_is_base() {
        let mut content = SiteContent::baseline().unwrap();
        content.brand.whatsapp_number_link = String::new();
        assert_eq!(whatsapp_url(&content, "  "), "https://api.whatsapp.com/send");
    }
}
