//! Storefront GraphQL query documents.

const PRODUCT_GID_PREFIX: &str = "gid://shopify/Product/";

/// Expand a bare product id into a global id and escape it for a string literal
fn product_gid(product_id: &str) -> String {
    let product_id = product_id.trim();
    let gid = if product_id.starts_with("gid://") {
        product_id.to_string()
    } else {
        format!("{}{}", PRODUCT_GID_PREFIX, product_id)
    };
    gid.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Query for one product: first 5 variants with prices, first 10 images.
pub fn single_product_query(product_id: &str) -> String {
    format!(
        r#"{{
  product(id: "{gid}") {{
    id
    title
    description
    variants(first: 5) {{
      edges {{
        node {{
          id
          priceV2 {{
            amount
            currencyCode
          }}
        }}
      }}
    }}
    images(first: 10) {{
      edges {{
        node {{
          src
        }}
      }}
    }}
  }}
}}"#,
        gid = product_gid(product_id)
    )
}

/// Query for the catalog listing: first 100 products with availability and
/// cursor info.
pub fn available_products_query() -> String {
    r#"{
  products(first: 100) {
    edges {
      node {
        id
        title
        availableForSale
        variants(first: 100) {
          edges {
            node {
              id
              availableForSale
            }
          }
        }
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}"#
    .to_string()
}
