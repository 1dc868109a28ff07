//! Checkout plans and Creem product configuration.
//!
//! Plan/cycle pairs map to per-environment product ids supplied via env vars.
//! Operators routinely paste the wrong value into those vars (webhook
//! secrets, API keys, truncated dashboard copies), so ids are sanity-checked
//! before use and a readiness report can enumerate exactly what is missing.

use serde::{Deserialize, Serialize};

use crate::config::CreemConfig;
use crate::error::{AppError, AppResult};

pub const CREEM_TEST_BASE_URL: &str = "https://test-api.creem.io";
pub const CREEM_PROD_BASE_URL: &str = "https://api.creem.io";

/// Purchasable plans: three subscriptions plus four one-time credit packs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPlan {
    Basic,
    Pro,
    Max,
    StarterPack,
    GrowthPack,
    ProfessionalPack,
    EnterprisePack,
}

impl CheckoutPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutPlan::Basic => "basic",
            CheckoutPlan::Pro => "pro",
            CheckoutPlan::Max => "max",
            CheckoutPlan::StarterPack => "starter_pack",
            CheckoutPlan::GrowthPack => "growth_pack",
            CheckoutPlan::ProfessionalPack => "professional_pack",
            CheckoutPlan::EnterprisePack => "enterprise_pack",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
    Once,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Yearly => "yearly",
            BillingCycle::Once => "once",
        }
    }
}

/// Body of `POST /api/checkout`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub plan: CheckoutPlan,
    #[serde(rename = "billingCycle")]
    pub billing_cycle: BillingCycle,
    pub units: Option<u32>,
}

impl CheckoutRequest {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(units) = self.units {
            if units == 0 || units > 1000 {
                return Err(AppError::InvalidInput(
                    "units must be between 1 and 1000".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Reject values that are clearly not product ids: blanks, truncated
/// dashboard copies, and secrets pasted into the wrong env var.
fn normalize_product_id(value: Option<&str>) -> Option<&str> {
    let trimmed = value?.trim();
    if trimmed.is_empty() || trimmed.contains("...") {
        return None;
    }
    if trimmed.starts_with("whsec_")
        || trimmed.starts_with("pwhsec_")
        || trimmed.starts_with("creem_")
    {
        return None;
    }
    if trimmed.len() < 10 {
        return None;
    }
    Some(trimmed)
}

impl CreemConfig {
    fn is_test_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|k| k.starts_with("creem_test_"))
    }

    /// Pick the API host matching the key's environment. An explicit
    /// `CREEM_API_BASE_URL` wins unless it contradicts the key (test key on
    /// the live host, or vice versa), which gets corrected rather than
    /// producing confusing 403s.
    pub fn api_base_url(&self) -> String {
        let is_test_key = self.is_test_key();
        if let Some(configured) = self.api_base_url.as_deref() {
            if is_test_key && configured.contains("api.creem.io") && !configured.contains("test-api")
            {
                return CREEM_TEST_BASE_URL.to_string();
            }
            if !is_test_key && configured.contains("test-api.creem.io") {
                return CREEM_PROD_BASE_URL.to_string();
            }
            return configured.to_string();
        }
        if is_test_key {
            CREEM_TEST_BASE_URL.to_string()
        } else {
            CREEM_PROD_BASE_URL.to_string()
        }
    }

    /// Resolve the product id for a plan/cycle pair. `None` when payments
    /// are disabled, the pairing is invalid (subscriptions only bill
    /// monthly/yearly, packs only once), or the configured value fails
    /// normalization.
    pub fn product_id(&self, plan: CheckoutPlan, cycle: BillingCycle) -> Option<&str> {
        if !self.enable_payments {
            return None;
        }

        let raw = match (plan, cycle) {
            (CheckoutPlan::StarterPack, BillingCycle::Once) => &self.pack_starter,
            (CheckoutPlan::GrowthPack, BillingCycle::Once) => &self.pack_growth,
            (CheckoutPlan::ProfessionalPack, BillingCycle::Once) => &self.pack_professional,
            (CheckoutPlan::EnterprisePack, BillingCycle::Once) => &self.pack_enterprise,
            (CheckoutPlan::Basic, BillingCycle::Monthly) => &self.basic_monthly,
            (CheckoutPlan::Basic, BillingCycle::Yearly) => &self.basic_yearly,
            (CheckoutPlan::Pro, BillingCycle::Monthly) => &self.pro_monthly,
            (CheckoutPlan::Pro, BillingCycle::Yearly) => &self.pro_yearly,
            (CheckoutPlan::Max, BillingCycle::Monthly) => &self.max_monthly,
            (CheckoutPlan::Max, BillingCycle::Yearly) => &self.max_yearly,
            _ => return None,
        };
        normalize_product_id(raw.as_deref())
    }
}

#[derive(Debug, Serialize)]
pub struct PlanAvailability {
    pub monthly: bool,
    pub yearly: bool,
}

#[derive(Debug, Serialize)]
pub struct PlansReport {
    pub basic: PlanAvailability,
    pub pro: PlanAvailability,
    pub max: PlanAvailability,
}

#[derive(Debug, Serialize)]
pub struct PacksReport {
    pub starter_pack: bool,
    pub growth_pack: bool,
    pub professional_pack: bool,
    pub enterprise_pack: bool,
}

/// Payload of `GET /api/checkout/config`.
#[derive(Debug, Serialize)]
pub struct CheckoutConfigReport {
    pub ready: bool,
    pub missing: Vec<&'static str>,
    pub plans: PlansReport,
    pub packs: PacksReport,
}

/// Readiness snapshot: which credentials are absent and which plan/pack
/// buttons the front-end may enable. Secret values are never included, only
/// the env var names that still need to be set.
pub fn checkout_config_report(creem: &CreemConfig) -> CheckoutConfigReport {
    let mut missing: Vec<&'static str> = Vec::new();

    if creem.api_key.is_none() {
        missing.push("CREEM_API_KEY");
    }
    if creem.webhook_secret.is_none() {
        missing.push("CREEM_WEBHOOK_SECRET");
    }

    let enabled = creem.enable_payments;

    let subscriptions: [(&'static str, CheckoutPlan, BillingCycle); 6] = [
        ("CREEM_BASIC_MONTHLY_PRODUCT_ID", CheckoutPlan::Basic, BillingCycle::Monthly),
        ("CREEM_BASIC_YEARLY_PRODUCT_ID", CheckoutPlan::Basic, BillingCycle::Yearly),
        ("CREEM_PRO_MONTHLY_PRODUCT_ID", CheckoutPlan::Pro, BillingCycle::Monthly),
        ("CREEM_PRO_YEARLY_PRODUCT_ID", CheckoutPlan::Pro, BillingCycle::Yearly),
        ("CREEM_MAX_MONTHLY_PRODUCT_ID", CheckoutPlan::Max, BillingCycle::Monthly),
        ("CREEM_MAX_YEARLY_PRODUCT_ID", CheckoutPlan::Max, BillingCycle::Yearly),
    ];
    let mut have = [false; 6];
    for (i, (name, plan, cycle)) in subscriptions.iter().enumerate() {
        have[i] = creem.product_id(*plan, *cycle).is_some();
        if enabled && !have[i] {
            missing.push(name);
        }
    }

    let packs: [(&'static str, CheckoutPlan); 4] = [
        ("CREEM_CREDIT_PACK_STARTER_PRODUCT_ID", CheckoutPlan::StarterPack),
        ("CREEM_CREDIT_PACK_GROWTH_PRODUCT_ID", CheckoutPlan::GrowthPack),
        ("CREEM_CREDIT_PACK_PROFESSIONAL_PRODUCT_ID", CheckoutPlan::ProfessionalPack),
        ("CREEM_CREDIT_PACK_ENTERPRISE_PRODUCT_ID", CheckoutPlan::EnterprisePack),
    ];
    let mut have_packs = [false; 4];
    for (i, (name, plan)) in packs.iter().enumerate() {
        have_packs[i] = creem.product_id(*plan, BillingCycle::Once).is_some();
        if enabled && !have_packs[i] {
            missing.push(name);
        }
    }

    CheckoutConfigReport {
        ready: missing.is_empty(),
        missing,
        plans: PlansReport {
            basic: PlanAvailability { monthly: enabled && have[0], yearly: enabled && have[1] },
            pro: PlanAvailability { monthly: enabled && have[2], yearly: enabled && have[3] },
            max: PlanAvailability { monthly: enabled && have[4], yearly: enabled && have[5] },
        },
        packs: PacksReport {
            starter_pack: enabled && have_packs[0],
            growth_pack: enabled && have_packs[1],
            professional_pack: enabled && have_packs[2],
            enterprise_pack: enabled && have_packs[3],
        },
    }
}
