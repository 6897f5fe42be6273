//! Normalization from GraphQL wire shapes into core domain types.
//!
//! Every cart-returning call site goes through [`convert_cart`] /
//! [`cart_from_mutation`] - there is exactly one mapping of the provider's
//! cart shape into ours.

use copper_state_core::{
    Attribute, Cart, CartCost, CartLine, CartMerchandise, CartMerchandiseProduct, Image, Money,
    Product, ProductVariant,
};

use super::super::ShopifyError;
use super::queries::{
    CartMutationPayload, WireCart, WireCartLine, WireImage, WireMoney, WireProduct, WireUserError,
};

pub fn convert_cart(cart: WireCart) -> Cart {
    Cart {
        id: cart.id,
        checkout_url: cart.checkout_url,
        total_quantity: cart.total_quantity,
        cost: CartCost {
            subtotal: convert_money(cart.cost.subtotal_amount),
            total: convert_money(cart.cost.total_amount),
        },
        lines: cart
            .lines
            .into_nodes()
            .into_iter()
            .map(convert_cart_line)
            .collect(),
    }
}

fn convert_cart_line(line: WireCartLine) -> CartLine {
    CartLine {
        id: line.id,
        quantity: line.quantity,
        attributes: line
            .attributes
            .into_iter()
            .map(|a| Attribute {
                key: a.key,
                value: a.value,
            })
            .collect(),
        merchandise: CartMerchandise {
            id: line.merchandise.id,
            title: line.merchandise.title,
            price: convert_money(line.merchandise.price),
            product: CartMerchandiseProduct {
                id: line.merchandise.product.id,
                title: line.merchandise.product.title,
                handle: line.merchandise.product.handle,
                featured_image: line.merchandise.product.featured_image.map(convert_image),
            },
        },
    }
}

pub fn convert_product(product: WireProduct) -> Product {
    Product {
        id: product.id,
        title: product.title,
        handle: product.handle,
        description: product.description,
        images: product
            .images
            .into_nodes()
            .into_iter()
            .map(convert_image)
            .collect(),
        variants: product
            .variants
            .into_nodes()
            .into_iter()
            .map(|v| ProductVariant {
                id: v.id,
                title: v.title,
                available_for_sale: v.available_for_sale,
                price: convert_money(v.price),
                compare_at_price: v.compare_at_price.map(convert_money),
            })
            .collect(),
    }
}

fn convert_money(money: WireMoney) -> Money {
    Money {
        amount: money.amount,
        currency_code: money.currency_code,
    }
}

fn convert_image(image: WireImage) -> Image {
    Image {
        url: image.url,
        alt_text: image.alt_text,
    }
}

/// Resolve a mutation payload into the updated cart.
///
/// Provider-reported `userErrors` become a single Validation error
/// aggregating every message; a payload with neither errors nor a cart is
/// treated as a failed mutation.
pub fn cart_from_mutation(
    payload: Option<CartMutationPayload>,
    operation: &str,
) -> Result<Cart, ShopifyError> {
    let Some(payload) = payload else {
        return Err(ShopifyError::GraphQL(vec![
            super::super::GraphQLError::message_only(format!("{operation}: no mutation payload")),
        ]));
    };

    if !payload.user_errors.is_empty() {
        return Err(ShopifyError::UserError(aggregate_user_errors(
            &payload.user_errors,
        )));
    }

    payload.cart.map(convert_cart).ok_or_else(|| {
        ShopifyError::GraphQL(vec![super::super::GraphQLError::message_only(format!(
            "{operation}: mutation returned no cart"
        ))])
    })
}

fn aggregate_user_errors(errors: &[WireUserError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}
