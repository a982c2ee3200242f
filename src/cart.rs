use crate::errors::AppError;
use crate::events::next_id;
use crate::models::{AppData, CartItem, CartResponse, CheckoutRequest, PurchaseSummary};

pub const UNIT_PRICE: i64 = 9900;

pub fn add_item(
    data: &mut AppData,
    image_data: &str,
    now_millis: i64,
    timestamp: String,
) -> Result<CartItem, AppError> {
    if image_data.trim().is_empty() {
        return Err(AppError::bad_request("No image provided"));
    }

    let item = CartItem {
        id: next_id(now_millis, data.cart.iter().map(|item| item.id)),
        image_data: image_data.to_string(),
        timestamp,
        selected: true,
        textbook_name: data.settings.textbook_name.clone(),
        price: UNIT_PRICE,
    };
    data.cart.push(item.clone());
    Ok(item)
}

pub fn toggle_item(data: &mut AppData, id: i64) -> Result<CartItem, AppError> {
    let item = data
        .cart
        .iter_mut()
        .find(|item| item.id == id)
        .ok_or_else(|| AppError::not_found(format!("cart item {id} not found")))?;
    item.selected = !item.selected;
    Ok(item.clone())
}

pub fn remove_item(data: &mut AppData, id: i64) -> Result<(), AppError> {
    let before = data.cart.len();
    data.cart.retain(|item| item.id != id);
    if data.cart.len() == before {
        return Err(AppError::not_found(format!("cart item {id} not found")));
    }
    Ok(())
}

pub fn summarize(items: &[CartItem]) -> CartResponse {
    let selected: Vec<&CartItem> = items.iter().filter(|item| item.selected).collect();
    CartResponse {
        selected_count: selected.len(),
        total: selected.iter().map(|item| item.price).sum(),
        items: items.to_vec(),
    }
}

/// Simulated payment: validates the request, removes the selected items and
/// returns the summary to relay. The cart is untouched on error.
pub fn checkout(
    data: &mut AppData,
    request: &CheckoutRequest,
) -> Result<PurchaseSummary, AppError> {
    let email = request.email.trim();
    if email.is_empty() {
        return Err(AppError::bad_request("Email is required"));
    }
    let payment_method = request.payment_method.trim();
    if payment_method.is_empty() {
        return Err(AppError::bad_request("Payment method is required"));
    }

    let summary = summarize(&data.cart);
    if summary.selected_count == 0 {
        return Err(AppError::bad_request("No items selected"));
    }

    data.cart.retain(|item| !item.selected);

    Ok(PurchaseSummary {
        user_email: email.to_string(),
        item_count: summary.selected_count,
        total: summary.total,
        payment_method: payment_method.to_string(),
        textbook_name: data.settings.textbook_name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn request(email: &str, method: &str) -> CheckoutRequest {
        CheckoutRequest {
            email: email.to_string(),
            payment_method: method.to_string(),
        }
    }

    fn cart_with(count: usize) -> AppData {
        let mut data = AppData::default();
        for n in 0..count {
            add_item(&mut data, "data:image/png;base64,AAAA", 1_000, format!("t{n}")).unwrap();
        }
        data
    }

    #[test]
    fn add_uses_unit_price_and_unique_ids() {
        let data = cart_with(3);
        let ids: Vec<i64> = data.cart.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![1_000, 1_001, 1_002]);
        assert!(data.cart.iter().all(|item| item.price == UNIT_PRICE && item.selected));
        assert_eq!(data.cart[0].textbook_name, "Textbook");
    }

    #[test]
    fn add_rejects_empty_image() {
        let mut data = AppData::default();
        let err = add_item(&mut data, "  ", 1, String::new()).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(data.cart.is_empty());
    }

    #[test]
    fn toggle_flips_selection() {
        let mut data = cart_with(1);
        let id = data.cart[0].id;
        assert!(!toggle_item(&mut data, id).unwrap().selected);
        assert!(toggle_item(&mut data, id).unwrap().selected);
        assert_eq!(toggle_item(&mut data, 42).unwrap_err().status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn checkout_sums_selected_and_clears_them() {
        let mut data = cart_with(3);
        let skipped = data.cart[1].id;
        toggle_item(&mut data, skipped).unwrap();

        let summary = checkout(&mut data, &request("kim@example.com", "card")).unwrap();
        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.total, 2 * UNIT_PRICE);
        assert_eq!(data.cart.len(), 1);
        assert_eq!(data.cart[0].id, skipped);
    }

    #[test]
    fn checkout_requires_email_method_and_selection() {
        let mut data = cart_with(1);
        assert!(checkout(&mut data, &request("", "card")).is_err());
        assert!(checkout(&mut data, &request("kim@example.com", " ")).is_err());
        assert_eq!(data.cart.len(), 1);

        let id = data.cart[0].id;
        toggle_item(&mut data, id).unwrap();
        let err = checkout(&mut data, &request("kim@example.com", "card")).unwrap_err();
        assert_eq!(err.message, "No items selected");
        assert_eq!(data.cart.len(), 1);
    }

    #[test]
    fn remove_deletes_single_item() {
        let mut data = cart_with(2);
        let id = data.cart[0].id;
        remove_item(&mut data, id).unwrap();
        assert_eq!(data.cart.len(), 1);
        assert!(remove_item(&mut data, id).is_err());
    }
}
