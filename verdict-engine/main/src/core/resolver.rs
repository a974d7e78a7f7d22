use std::sync::Arc;

use crate::api::types::{EngineTrace, ItemParams, Itinerary, Resolved, ResolvedVerdict, Segment};
use crate::core::regstore::{RegulationIndex, StoredRule};
use crate::core::taxonomy::Taxonomy;
use crate::spi::traits::AirportDirectory;
use crate::spi::types::{BagTarget, Canonical, Constraints, RouteType, Scope, Severity, VerdictStatus};

/// Input to one rule resolution.
pub struct ResolveRequest<'a> {
    pub canonical: Canonical,
    pub params: &'a ItemParams,
    pub itinerary: &'a Itinerary,
    pub segments: &'a [Segment],
    pub duty_free: bool,
}

/// Resolver output: the authoritative verdicts plus the signals the
/// conflict detector needs.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub resolved: Resolved,
    pub trace: EngineTrace,
    /// Strongest status any rule (not the template) emitted per bag.
    pub carry_rule_status: Option<VerdictStatus>,
    pub checked_rule_status: Option<VerdictStatus>,
    /// An applied rule demands a security tamper-evident bag.
    pub steb_required: bool,
}

struct Candidate {
    rule: Arc<StoredRule>,
    layer: u8,
    layer_label: String,
    specificity: u8,
}

/// Merge the applicable regulation layers for one item and itinerary.
///
/// Walks matching rules in descending specificity (ties broken by layer,
/// country > airline > international) and folds each into the taxonomy
/// default template over the `deny > limit > allow` lattice. Numeric caps
/// come from the highest-specificity capped rule only; lower rules
/// contribute additive badges.
pub fn resolve(
    taxonomy: &Taxonomy,
    index: &RegulationIndex,
    airports: &dyn AirportDirectory,
    req: &ResolveRequest<'_>,
) -> Resolution {
    let route_type = infer_route_type(req.itinerary, airports);
    let mut candidates = collect_candidates(index, airports, req, route_type);
    // Descending specificity; layer priority breaks ties. The sort is
    // stable so file order decides among true peers.
    candidates.sort_by(|a, b| {
        b.specificity
            .cmp(&a.specificity)
            .then(a.layer.cmp(&b.layer))
    });

    let (carry_template, checked_template) = taxonomy.default_verdicts(req.canonical);
    let template_code = format!("taxonomy:{}", req.canonical);

    let (carry_on, carry_rule_status) = merge_bag(
        BagTarget::CarryOn,
        &carry_template.status,
        &carry_template.badges,
        &template_code,
        &candidates,
        req.params,
    );
    let (checked, checked_rule_status) = merge_bag(
        BagTarget::Checked,
        &checked_template.status,
        &checked_template.badges,
        &template_code,
        &candidates,
        req.params,
    );

    let steb_required = candidates.iter().any(|c| {
        c.rule.rule.constraints.requires_steb == Some(true)
    });

    let mut applied_rules = Vec::new();
    let mut layers = Vec::new();
    for candidate in &candidates {
        push_unique(&mut applied_rules, candidate.rule.id.clone());
        push_unique(&mut layers, candidate.layer_label.clone());
    }

    Resolution {
        resolved: Resolved { carry_on, checked },
        trace: EngineTrace {
            canonical: req.canonical,
            params: *req.params,
            template: template_code,
            applied_rules,
            layers,
        },
        carry_rule_status,
        checked_rule_status,
        steb_required,
    }
}

/// Domestic when every airport resolves to the same country; unknown
/// airports leave the route type undetermined, matching only
/// unconditional rules.
fn infer_route_type(itinerary: &Itinerary, airports: &dyn AirportDirectory) -> Option<RouteType> {
    let mut countries = Vec::new();
    for airport in itinerary.airports() {
        countries.push(airports.country(airport)?);
    }
    let first = countries.first()?;
    if countries.iter().all(|c| c == first) {
        Some(RouteType::Domestic)
    } else {
        Some(RouteType::International)
    }
}

fn collect_candidates(
    index: &RegulationIndex,
    airports: &dyn AirportDirectory,
    req: &ResolveRequest<'_>,
    route_type: Option<RouteType>,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    // L1: country security and customs rules along the route. An airport
    // the directory does not know contributes no country layer.
    let mut countries = Vec::new();
    for airport in req.itinerary.airports() {
        if let Some(cc) = airports.country(airport) {
            push_unique(&mut countries, cc);
        }
    }
    for cc in &countries {
        for rule in index.find(Scope::Country, cc, req.canonical) {
            push_candidate(&mut candidates, rule, 1, format!("country:{cc}"), req, route_type, None);
        }
    }

    // L2: carrier rules per operated segment.
    let mut carriers = Vec::new();
    for segment in req.segments {
        push_unique(&mut carriers, segment.carrier.clone());
    }
    for carrier in &carriers {
        for rule in index.find(Scope::Airline, carrier, req.canonical) {
            push_candidate(
                &mut candidates,
                rule,
                2,
                format!("airline:{carrier}"),
                req,
                route_type,
                Some(carrier.as_str()),
            );
        }
    }

    // L3: international dangerous-goods rules, keyed on the canonical alone.
    for rule in index.find(Scope::International, "", req.canonical) {
        push_candidate(&mut candidates, rule, 3, "international".to_string(), req, route_type, None);
    }

    candidates
}

fn push_candidate(
    candidates: &mut Vec<Candidate>,
    rule: &Arc<StoredRule>,
    layer: u8,
    layer_label: String,
    req: &ResolveRequest<'_>,
    route_type: Option<RouteType>,
    carrier: Option<&str>,
) {
    let constraints = &rule.rule.constraints;
    if !conditions_match(constraints, route_type, req.segments, carrier) {
        return;
    }
    // Minimum-strength gates bound rule applicability, not compliance.
    if let (Some(min), Some(abv)) = (constraints.min_abv_percent, req.params.abv_percent) {
        if abv < min {
            return;
        }
    }
    candidates.push(Candidate {
        rule: rule.clone(),
        layer,
        layer_label,
        specificity: constraints.specificity(),
    });
}

/// A rule matches when each condition field is absent or equals the
/// request value. Carrier rules are checked against that carrier's own
/// segments only.
fn conditions_match(
    constraints: &Constraints,
    route_type: Option<RouteType>,
    segments: &[Segment],
    carrier: Option<&str>,
) -> bool {
    if let Some(required) = constraints.route_type {
        if route_type != Some(required) {
            return false;
        }
    }

    let mut considered = segments
        .iter()
        .filter(|s| carrier.is_none_or(|c| s.carrier == c));

    if let Some(required_cabin) = constraints.cabin_class {
        let fare = constraints.fare_class.as_deref();
        return considered.any(|s| {
            s.cabin_class == required_cabin
                && fare.is_none_or(|f| s.fare_class.as_deref() == Some(f))
        });
    }
    if let Some(required_fare) = constraints.fare_class.as_deref() {
        return considered.any(|s| s.fare_class.as_deref() == Some(required_fare));
    }
    true
}

fn merge_bag(
    bag: BagTarget,
    template_status: &VerdictStatus,
    template_badges: &[String],
    template_code: &str,
    candidates: &[Candidate],
    params: &ItemParams,
) -> (ResolvedVerdict, Option<VerdictStatus>) {
    let mut status = *template_status;
    let mut badges: Vec<String> = template_badges.to_vec();
    let mut reason_codes = vec![template_code.to_string()];
    let mut rule_status: Option<VerdictStatus> = None;
    let mut caps_owned = false;

    for candidate in candidates {
        let rule = &candidate.rule.rule;
        match rule.constraints.applies_to() {
            BagTarget::Both => {}
            target if target == bag => {}
            _ => continue,
        }

        let violation = violated_cap(&rule.constraints, params);
        let derived = match rule.severity {
            Severity::Block => VerdictStatus::Deny,
            Severity::Warn if violation.is_some() => VerdictStatus::Deny,
            Severity::Warn => VerdictStatus::Limit,
            Severity::Info => VerdictStatus::Allow,
        };

        status = status.max(derived);
        rule_status = Some(rule_status.map_or(derived, |s| s.max(derived)));

        if let Some(notes) = &rule.notes {
            push_unique(&mut badges, notes.clone());
        }
        if let Some(text) = violation {
            push_unique(&mut badges, text);
        }
        if !caps_owned {
            for badge in cap_badges(&rule.constraints) {
                push_unique(&mut badges, badge);
            }
            caps_owned = has_caps(&rule.constraints);
        }
        if rule.constraints.requires_steb == Some(true) {
            push_unique(&mut badges, "sealed STEB required".to_string());
        }
        push_unique(&mut reason_codes, candidate.rule.id.clone());
    }

    (
        ResolvedVerdict {
            status,
            badges,
            reason_codes,
        },
        rule_status,
    )
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

fn has_caps(constraints: &Constraints) -> bool {
    constraints.max_volume_ml.is_some()
        || constraints.total_volume_ml.is_some()
        || constraints.max_wh.is_some()
        || constraints.max_count.is_some()
        || constraints.max_weight_kg.is_some()
        || constraints.max_blade_length_cm.is_some()
        || constraints.max_abv_percent.is_some()
        || constraints.max_pieces.is_some()
}

/// First cap the known parameters violate, described for a badge.
fn violated_cap(constraints: &Constraints, params: &ItemParams) -> Option<String> {
    if let (Some(cap), Some(volume)) = (constraints.max_volume_ml, params.volume_ml) {
        if volume > cap {
            return Some(format!("exceeds {} ml per container", fmt_num(cap)));
        }
    }
    if let (Some(cap), Some(volume)) = (constraints.total_volume_ml, params.volume_ml) {
        let total = volume * params.count.unwrap_or(1.0);
        if total > cap {
            return Some(format!("exceeds {} ml total", fmt_num(cap)));
        }
    }
    if let (Some(cap), Some(wh)) = (constraints.max_wh, params.wh) {
        if wh > cap {
            return Some(format!("exceeds {} Wh per battery", fmt_num(cap)));
        }
    }
    if let (Some(cap), Some(count)) = (constraints.max_count, params.count) {
        if count > cap {
            return Some(format!("exceeds {} units", fmt_num(cap)));
        }
    }
    if let (Some(cap), Some(weight)) = (constraints.max_weight_kg, params.weight_kg) {
        if weight > cap {
            return Some(format!("exceeds {} kg", fmt_num(cap)));
        }
    }
    if let (Some(cap), Some(blade)) = (constraints.max_blade_length_cm, params.blade_length_cm) {
        if blade > cap {
            return Some(format!("blade exceeds {} cm", fmt_num(cap)));
        }
    }
    if let (Some(cap), Some(abv)) = (constraints.max_abv_percent, params.abv_percent) {
        if abv > cap {
            return Some(format!("exceeds {}% ABV", fmt_num(cap)));
        }
    }
    None
}

/// Badge text for the numeric caps a rule carries.
fn cap_badges(constraints: &Constraints) -> Vec<String> {
    let mut badges = Vec::new();
    if let Some(cap) = constraints.max_volume_ml {
        badges.push(format!("≤{} ml per container", fmt_num(cap)));
    }
    if let Some(cap) = constraints.total_volume_ml {
        badges.push(format!("≤{} ml total", fmt_num(cap)));
    }
    if let Some(cap) = constraints.max_wh {
        badges.push(format!("≤{} Wh per battery", fmt_num(cap)));
    }
    if let Some(cap) = constraints.max_count {
        badges.push(format!("≤{} units", fmt_num(cap)));
    }
    if let Some(cap) = constraints.max_weight_kg {
        badges.push(format!("≤{} kg", fmt_num(cap)));
    }
    if let Some(cap) = constraints.max_blade_length_cm {
        badges.push(format!("blade ≤{} cm", fmt_num(cap)));
    }
    match (constraints.min_abv_percent, constraints.max_abv_percent) {
        (Some(min), Some(max)) => badges.push(format!("{}–{}% ABV", fmt_num(min), fmt_num(max))),
        (None, Some(max)) => badges.push(format!("≤{}% ABV", fmt_num(max))),
        _ => {}
    }
    if let Some(cap) = constraints.max_pieces {
        badges.push(format!("max {cap} pieces"));
    }
    badges
}

fn fmt_num(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

