//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::shop::ProductSummary;
use crate::state::AppState;

// =============================================================================
// Carousel (static content)
// =============================================================================

/// A single slide in the hero carousel.
#[derive(Clone)]
pub struct HeroSlide {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub button_text: Option<String>,
    pub button_url: Option<String>,
    pub image_path: String,
    pub image_alt: String,
}

/// Hero carousel configuration. Slides scroll-snap horizontally.
#[derive(Clone)]
pub struct HeroConfig {
    pub slides: Vec<HeroSlide>,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            slides: vec![
                HeroSlide {
                    title: Some("Fresh milk, delivered daily".to_string()),
                    subtitle: Some(
                        "Pasteurised and UHT milk from Vietnam's best dairies, at your door before breakfast.".to_string(),
                    ),
                    button_text: Some("Shop fresh milk".to_string()),
                    button_url: Some("/#best-sellers".to_string()),
                    image_path: "/static/images/hero/fresh-milk.svg".to_string(),
                    image_alt: "Glass bottles of fresh milk".to_string(),
                },
                HeroSlide {
                    title: Some("Formula for every stage".to_string()),
                    subtitle: Some(
                        "Infant and growing-up formula matched to your child's age.".to_string(),
                    ),
                    button_text: Some("Find the right formula".to_string()),
                    button_url: Some("/#best-sellers".to_string()),
                    image_path: "/static/images/hero/formula.svg".to_string(),
                    image_alt: "Tins of infant formula".to_string(),
                },
                HeroSlide {
                    title: None,
                    subtitle: None,
                    button_text: None,
                    button_url: None,
                    image_path: "/static/images/hero/free-shipping.svg".to_string(),
                    image_alt: "Free shipping on orders over 500.000 ₫".to_string(),
                },
            ],
        }
    }
}

// =============================================================================
// Brands, News and Feedback (static content)
// =============================================================================

/// A featured dairy brand.
#[derive(Clone)]
pub struct BrandView {
    pub name: &'static str,
    pub logo_path: &'static str,
}

fn get_featured_brands() -> Vec<BrandView> {
    vec![
        BrandView {
            name: "Vinamilk",
            logo_path: "/static/images/brands/vinamilk.svg",
        },
        BrandView {
            name: "TH true MILK",
            logo_path: "/static/images/brands/th-true-milk.svg",
        },
        BrandView {
            name: "Dutch Lady",
            logo_path: "/static/images/brands/dutch-lady.svg",
        },
        BrandView {
            name: "Abbott",
            logo_path: "/static/images/brands/abbott.svg",
        },
        BrandView {
            name: "Nestlé",
            logo_path: "/static/images/brands/nestle.svg",
        },
        BrandView {
            name: "Meiji",
            logo_path: "/static/images/brands/meiji.svg",
        },
    ]
}

/// A news article teaser.
#[derive(Clone)]
pub struct ArticleView {
    pub title: &'static str,
    pub summary: &'static str,
    pub image_path: &'static str,
    pub published: &'static str,
}

fn get_news_articles() -> Vec<ArticleView> {
    vec![
        ArticleView {
            title: "How to store fresh milk so it lasts",
            summary: "Keep it cold, keep it closed, and finish an opened bottle within three days.",
            image_path: "/static/images/news/storing-milk.svg",
            published: "2024-05-12",
        },
        ArticleView {
            title: "Switching formula without an upset tummy",
            summary: "A week-long schedule for mixing the old and new formula.",
            image_path: "/static/images/news/switching-formula.svg",
            published: "2024-04-28",
        },
        ArticleView {
            title: "Calcium needs from toddler to teen",
            summary: "How many glasses a day your child needs at each age.",
            image_path: "/static/images/news/calcium.svg",
            published: "2024-04-03",
        },
    ]
}

/// A customer testimonial for display on the homepage.
#[derive(Clone)]
pub struct FeedbackView {
    pub customer_name: &'static str,
    pub rating: u8,
    pub content: &'static str,
}

impl FeedbackView {
    /// `★★★★☆` for a rating of 4.
    #[must_use]
    pub fn stars(&self) -> String {
        let filled = usize::from(self.rating.min(5));
        format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
    }
}

fn get_feedback() -> Vec<FeedbackView> {
    vec![
        FeedbackView {
            customer_name: "Chị Lan, Quận 7",
            rating: 5,
            content: "Ordered in the evening and the milk arrived cold the next morning. Will buy again.",
        },
        FeedbackView {
            customer_name: "Anh Minh, Hà Nội",
            rating: 5,
            content: "Genuine imported formula with a clear expiry date. Very reassuring.",
        },
        FeedbackView {
            customer_name: "Chị Thảo, Đà Nẵng",
            rating: 4,
            content: "Good prices and quick support when I needed to change my address.",
        },
    ]
}

// =============================================================================
// Product Views
// =============================================================================

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub name: String,
    pub price: String,
    pub original_price: Option<String>,
    pub image: Option<String>,
}

impl From<&ProductSummary> for ProductView {
    fn from(product: &ProductSummary) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.display(),
            original_price: product
                .original_price
                .filter(|original| *original > product.price)
                .map(|original| original.display()),
            image: product.image.clone(),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub customer_name: Option<String>,
    /// Hero carousel configuration.
    pub hero: HeroConfig,
    pub best_sellers: Vec<ProductView>,
    pub brands: Vec<BrandView>,
    pub articles: Vec<ArticleView>,
    pub feedback: Vec<FeedbackView>,
}

/// Number of best sellers to show.
const BEST_SELLER_COUNT: u32 = 8;

/// Display the home page.
#[instrument(skip(state, customer))]
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(customer): OptionalAuth,
) -> impl IntoResponse {
    let best_sellers = state
        .shop()
        .best_selling_products(BEST_SELLER_COUNT)
        .await
        .map_or_else(
            |e| {
                tracing::error!("Failed to fetch best sellers: {e}");
                Vec::new()
            },
            |products| products.iter().map(ProductView::from).collect(),
        );

    HomeTemplate {
        customer_name: customer.map(|c| c.display_name().to_string()),
        hero: HeroConfig::default(),
        best_sellers,
        brands: get_featured_brands(),
        articles: get_news_articles(),
        feedback: get_feedback(),
    }
}
