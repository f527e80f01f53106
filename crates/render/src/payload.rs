//! Render request construction: one template strategy per plan family.
//!
//! A request is a template reference, the fonts the template needs, and a
//! flat list of layer overrides (image sources and text values). Building
//! is pure: the same [`FormInput`] always produces byte-identical JSON, so
//! a job can be re-submitted after a failure without drift.

use serde::Serialize;

use planreel_core::error::CoreError;
use planreel_core::form::{FormInput, PlanKind};
use planreel_core::money::{format_grouped, format_inr};
use planreel_core::projection::{self, WITHDRAWAL_SCHEDULE};

// ---------------------------------------------------------------------------
// Template catalog
// ---------------------------------------------------------------------------

/// Template for the shared savings/life endowment video.
const ENDOWMENT_TEMPLATE_ID: &str = "01K2MFCW20CFAWHF5JZ96287FX";
/// Template for the goal-maximizer child plan video.
const GOAL_TEMPLATE_ID: &str = "01K38JV0SPGZJ8RH6RJ44Y57GW";
/// Both templates render their main composition under this name.
const MAIN_COMPOSITION: &str = "MainComp";

const ENDOWMENT_FONTS: [&str; 2] = ["Montserrat-SemiBold.ttf", "Montserrat-Medium.ttf"];
const GOAL_FONTS: [&str; 3] = [
    "Roboto_Condensed-Bold.ttf",
    "Roboto-BoldItalic.ttf",
    "Roboto-Bold.ttf",
];

/// Text property targeted by data overrides on text layers.
const SOURCE_TEXT: &str = "Source Text";

/// Child age printed on the first milestone slide of the goal template.
pub const CHILD_BASE_AGE: u32 = 5;

/// Years ahead of the policy start for the four milestone slides. The
/// first three line up with the withdrawal schedule years.
const MILESTONE_OFFSETS: [u32; 4] = [15, 20, 27, 35];

fn brand_logo_url(plan: PlanKind) -> &'static str {
    match plan {
        PlanKind::SecureSavings => "https://cdn.planreel.io/brand/secure-savings.png",
        PlanKind::SecureLife => "https://cdn.planreel.io/brand/secure-life.png",
        // The goal template carries its branding in the composition itself.
        PlanKind::GoalMaximizer => "",
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Complete job payload accepted by the render service's `POST /jobs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderRequest {
    pub preview: bool,
    pub template: TemplateRef,
    pub fonts: Vec<String>,
    pub assets: Vec<AssetSpec>,
}

/// Reference to a stored template and the composition to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateRef {
    pub id: String,
    pub composition: String,
}

/// One layer override inside a render request.
///
/// `type: "image"` replaces a layer's footage source; `type: "data"`
/// writes `value` into the layer property named by `property`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSpec {
    pub r#type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    pub layer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl AssetSpec {
    /// Image override: replace `layer_name`'s source with `src`.
    pub fn image(src: impl Into<String>, layer_name: impl Into<String>) -> Self {
        Self {
            r#type: "image",
            src: Some(src.into()),
            layer_name: layer_name.into(),
            property: None,
            value: None,
        }
    }

    /// Data override: write `value` into `property` of `layer_name`.
    pub fn data(
        layer_name: impl Into<String>,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            r#type: "data",
            src: None,
            layer_name: layer_name.into(),
            property: Some(property.into()),
            value: Some(value.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Build the render request for a validated form.
///
/// Validates the input first and picks the template strategy for the
/// selected plan. Never performs I/O; errors are always
/// [`CoreError::Validation`].
pub fn build_render_request(input: &FormInput) -> Result<RenderRequest, CoreError> {
    input.validate()?;
    match input.plan {
        PlanKind::SecureSavings | PlanKind::SecureLife => Ok(endowment_request(input)),
        PlanKind::GoalMaximizer => Ok(goal_request(input)),
    }
}

/// Savings/life endowment template: brand logo, welcome and thank-you
/// name slides, pay/get amounts over the premium term.
fn endowment_request(input: &FormInput) -> RenderRequest {
    let premium = input.premium_amount as i64;
    let total = premium * i64::from(input.tenure_years);
    let tenure = input.tenure_years;
    let logo = brand_logo_url(input.plan);

    let assets = vec![
        AssetSpec::image(logo, "BrandLogoSlide1"),
        AssetSpec::image(logo, "BrandLogoSlide3"),
        AssetSpec::data(
            "CustomerName",
            SOURCE_TEXT,
            format!("Welcome {}", input.customer_name),
        ),
        AssetSpec::data("CustomerName", "Source Text.font", "Montserrat-SemiBold"),
        AssetSpec::data("GiveAmount", SOURCE_TEXT, format!("₹{}", format_grouped(premium))),
        AssetSpec::data("GiveTenure", SOURCE_TEXT, format!("For {tenure} years")),
        AssetSpec::data(
            "GiveStatement",
            SOURCE_TEXT,
            format!(
                "Pay total ₹{} over the premium term of {tenure} years",
                format_grouped(total)
            ),
        ),
        AssetSpec::data("GetAmount", SOURCE_TEXT, format!("₹{}", format_grouped(total))),
        AssetSpec::data(
            "ReturnPremium",
            SOURCE_TEXT,
            format!(
                "Return of Premium of ₹{} Lakhs on {tenure} years",
                format_grouped(total)
            ),
        ),
        AssetSpec::data("ThankYouName", SOURCE_TEXT, input.customer_name.clone()),
    ];

    RenderRequest {
        preview: false,
        template: TemplateRef {
            id: ENDOWMENT_TEMPLATE_ID.to_string(),
            composition: MAIN_COMPOSITION.to_string(),
        },
        fonts: ENDOWMENT_FONTS.iter().map(|f| f.to_string()).collect(),
        assets,
    }
}

/// Goal-maximizer template: policy details, four parent/child milestone
/// slides, the withdrawal schedule, and both projected maturity values.
fn goal_request(input: &FormInput) -> RenderRequest {
    // validate() guarantees these for the goal plan.
    let child_name = input.child_name.as_deref().unwrap_or_default();
    let customer_age = input.customer_age.unwrap_or_default();

    let premium = input.premium_amount;
    let projection = projection::project(premium as f64, input.tenure_years);

    let mut assets = vec![
        AssetSpec::data(
            "AnnualPremiumAmount",
            SOURCE_TEXT,
            format!("₹{} p.a.", format_inr(premium as i64)),
        ),
        AssetSpec::data(
            "PremiumTerm",
            SOURCE_TEXT,
            format!("{} years", input.tenure_years),
        ),
    ];

    for (i, offset) in MILESTONE_OFFSETS.iter().enumerate() {
        assets.push(AssetSpec::data(
            format!("ParentAge{}", i + 1),
            SOURCE_TEXT,
            format!("{} years", customer_age + offset),
        ));
    }
    for (i, offset) in MILESTONE_OFFSETS.iter().enumerate() {
        assets.push(AssetSpec::data(
            format!("ChildAge{}", i + 1),
            SOURCE_TEXT,
            format!("{} years", CHILD_BASE_AGE + offset),
        ));
    }
    // The name layers carry a trailing "age:" label that the adjacent age
    // layers complete in the composition.
    for i in 1..=MILESTONE_OFFSETS.len() {
        assets.push(AssetSpec::data(
            format!("ParentName{i}"),
            SOURCE_TEXT,
            format!("{} age:", input.customer_name),
        ));
    }
    for i in 1..=MILESTONE_OFFSETS.len() {
        assets.push(AssetSpec::data(
            format!("ChildName{i}"),
            SOURCE_TEXT,
            format!("{child_name} age:"),
        ));
    }

    for (i, (_year, multiple)) in WITHDRAWAL_SCHEDULE.iter().enumerate() {
        let amount = (premium as f64 * multiple).round() as i64;
        assets.push(AssetSpec::data(
            format!("Withdraw_{}", i + 1),
            SOURCE_TEXT,
            format!("₹{}", format_inr(amount)),
        ));
    }

    assets.push(AssetSpec::data(
        "MB_8per",
        SOURCE_TEXT,
        format!("₹{}", format_inr(projection.maturity_high)),
    ));
    assets.push(AssetSpec::data(
        "MB_4per",
        SOURCE_TEXT,
        format!("₹{}", format_inr(projection.maturity_low)),
    ));

    RenderRequest {
        preview: false,
        template: TemplateRef {
            id: GOAL_TEMPLATE_ID.to_string(),
            composition: MAIN_COMPOSITION.to_string(),
        },
        fonts: GOAL_FONTS.iter().map(|f| f.to_string()).collect(),
        assets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn savings_input() -> FormInput {
        FormInput {
            plan: PlanKind::SecureSavings,
            customer_name: "Asha Rao".to_string(),
            premium_amount: 100_000,
            tenure_years: 10,
            child_name: None,
            customer_age: None,
        }
    }

    fn goal_input() -> FormInput {
        FormInput {
            plan: PlanKind::GoalMaximizer,
            customer_name: "Asha Rao".to_string(),
            premium_amount: 100_000,
            tenure_years: 10,
            child_name: Some("Meera".to_string()),
            customer_age: Some(30),
        }
    }

    fn find_value<'a>(request: &'a RenderRequest, layer: &str) -> &'a str {
        request
            .assets
            .iter()
            .find(|a| a.layer_name == layer && a.property.as_deref() == Some(SOURCE_TEXT))
            .and_then(|a| a.value.as_deref())
            .unwrap_or_else(|| panic!("no Source Text asset for layer {layer}"))
    }

    #[test]
    fn endowment_template_and_fonts() {
        let request = build_render_request(&savings_input()).unwrap();
        assert_eq!(request.template.id, ENDOWMENT_TEMPLATE_ID);
        assert_eq!(request.template.composition, "MainComp");
        assert_eq!(request.fonts.len(), 2);
        assert!(!request.preview);
        assert_eq!(request.assets.len(), 10);
    }

    #[test]
    fn endowment_text_layers() {
        let request = build_render_request(&savings_input()).unwrap();
        assert_eq!(find_value(&request, "CustomerName"), "Welcome Asha Rao");
        assert_eq!(find_value(&request, "GiveAmount"), "₹100,000");
        assert_eq!(find_value(&request, "GiveTenure"), "For 10 years");
        assert_eq!(
            find_value(&request, "GiveStatement"),
            "Pay total ₹1,000,000 over the premium term of 10 years"
        );
        assert_eq!(find_value(&request, "GetAmount"), "₹1,000,000");
        assert_eq!(
            find_value(&request, "ReturnPremium"),
            "Return of Premium of ₹1,000,000 Lakhs on 10 years"
        );
        assert_eq!(find_value(&request, "ThankYouName"), "Asha Rao");
    }

    #[test]
    fn endowment_name_font_override() {
        let request = build_render_request(&savings_input()).unwrap();
        let font = request
            .assets
            .iter()
            .find(|a| {
                a.layer_name == "CustomerName" && a.property.as_deref() == Some("Source Text.font")
            })
            .expect("font override present");
        assert_eq!(font.value.as_deref(), Some("Montserrat-SemiBold"));
    }

    #[test]
    fn logo_follows_plan() {
        let savings = build_render_request(&savings_input()).unwrap();
        let mut life_input = savings_input();
        life_input.plan = PlanKind::SecureLife;
        let life = build_render_request(&life_input).unwrap();

        for (request, suffix) in [(&savings, "secure-savings.png"), (&life, "secure-life.png")] {
            for layer in ["BrandLogoSlide1", "BrandLogoSlide3"] {
                let asset = request
                    .assets
                    .iter()
                    .find(|a| a.layer_name == layer)
                    .expect("logo asset present");
                assert_eq!(asset.r#type, "image");
                assert!(asset.src.as_deref().unwrap().ends_with(suffix));
            }
        }
    }

    #[test]
    fn goal_template_and_fonts() {
        let request = build_render_request(&goal_input()).unwrap();
        assert_eq!(request.template.id, GOAL_TEMPLATE_ID);
        assert_eq!(request.fonts.len(), 3);
        // 2 policy + 4 parent ages + 4 child ages + 4 parent names
        // + 4 child names + 3 withdrawals + 2 maturity values
        assert_eq!(request.assets.len(), 23);
        assert!(request.assets.iter().all(|a| a.r#type == "data"));
    }

    #[test]
    fn goal_policy_layers() {
        let request = build_render_request(&goal_input()).unwrap();
        assert_eq!(find_value(&request, "AnnualPremiumAmount"), "₹1,00,000 p.a.");
        assert_eq!(find_value(&request, "PremiumTerm"), "10 years");
    }

    #[test]
    fn goal_milestone_ages() {
        let request = build_render_request(&goal_input()).unwrap();
        assert_eq!(find_value(&request, "ParentAge1"), "45 years");
        assert_eq!(find_value(&request, "ParentAge2"), "50 years");
        assert_eq!(find_value(&request, "ParentAge3"), "57 years");
        assert_eq!(find_value(&request, "ParentAge4"), "65 years");
        assert_eq!(find_value(&request, "ChildAge1"), "20 years");
        assert_eq!(find_value(&request, "ChildAge4"), "40 years");
    }

    #[test]
    fn goal_name_layers_carry_age_label() {
        let request = build_render_request(&goal_input()).unwrap();
        for i in 1..=4 {
            assert_eq!(find_value(&request, &format!("ParentName{i}")), "Asha Rao age:");
            assert_eq!(find_value(&request, &format!("ChildName{i}")), "Meera age:");
        }
    }

    #[test]
    fn goal_withdrawals_scale_with_premium() {
        let request = build_render_request(&goal_input()).unwrap();
        assert_eq!(find_value(&request, "Withdraw_1"), "₹2,50,000");
        assert_eq!(find_value(&request, "Withdraw_2"), "₹1,00,000");
        assert_eq!(find_value(&request, "Withdraw_3"), "₹2,50,000");
    }

    #[test]
    fn goal_maturity_layers_use_projection() {
        let request = build_render_request(&goal_input()).unwrap();
        assert_eq!(find_value(&request, "MB_8per"), "₹1,00,69,967");
        assert_eq!(find_value(&request, "MB_4per"), "₹17,95,988");
    }

    #[test]
    fn build_is_deterministic() {
        assert_eq!(
            build_render_request(&goal_input()).unwrap(),
            build_render_request(&goal_input()).unwrap()
        );
    }

    #[test]
    fn invalid_input_is_rejected() {
        let mut input = goal_input();
        input.child_name = None;
        assert!(build_render_request(&input).is_err());
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let request = build_render_request(&savings_input()).unwrap();
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["template"]["id"], ENDOWMENT_TEMPLATE_ID);
        assert_eq!(value["preview"], false);

        let logo = &value["assets"][0];
        assert_eq!(logo["type"], "image");
        assert_eq!(logo["layerName"], "BrandLogoSlide1");
        assert!(logo.get("property").is_none());
        assert!(logo.get("value").is_none());

        let name = &value["assets"][2];
        assert_eq!(name["type"], "data");
        assert_eq!(name["property"], "Source Text");
        assert!(name.get("src").is_none());
    }
}
