// src/services/lead_scoring.rs
//
// Cálculo del lead score (0-100) y la probabilidad de conversión de un
// prospecto a partir de sus señales de engagement. El cálculo es una función
// pura sobre una foto de los datos; la persistencia va aparte.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{prospect_repo::ActivitySignal, ProspectRepository},
    models::prospect::{BrokerProspect, ProspectPriority, ProspectStatus, ProspectType},
};

// Foto de las señales de engagement de un prospecto
#[derive(Debug, Clone, Default)]
pub struct ProspectEngagement {
    // Actividades más recientes primero
    pub activities: Vec<ActivitySignal>,
    pub shared_properties: i64,
    pub shared_viewed: i64,
    pub rut_verified: bool,
}

// Factores individuales del score, cada uno con su techo de puntos
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadScoreFactors {
    pub has_complete_info: i32,   // 0-10
    pub has_rut: i32,             // 0-10
    pub activity_level: i32,      // 0-15
    pub properties_viewed: i32,   // 0-10
    pub response_time: i32,       // 0-10
    pub share_opens: i32,         // 0-5
    pub budget: i32,              // 0-10
    pub preferred_locations: i32, // 0-10
    pub time_to_decision: i32,    // 0-10
    pub referral_source: i32,     // 0-10
    pub broker_interactions: i32, // 0-10
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadScoreResult {
    pub lead_score: i32,
    pub conversion_probability: i32,
    pub factors: LeadScoreFactors,
    pub recommendations: Vec<String>,
}

const INTERACTION_TYPES: [&str; 4] = ["call", "meeting", "email", "message"];

// El score total es la suma de los factores, con techo en 100
pub fn compute_lead_score(
    prospect: &BrokerProspect,
    engagement: &ProspectEngagement,
    now: DateTime<Utc>,
) -> LeadScoreResult {
    let factors = LeadScoreFactors {
        has_complete_info: complete_info_score(prospect),
        has_rut: rut_score(prospect, engagement),
        activity_level: activity_level_score(engagement),
        properties_viewed: properties_viewed_score(engagement),
        response_time: response_time_score(engagement),
        share_opens: share_opens_score(engagement),
        budget: budget_score(prospect),
        preferred_locations: preferred_locations_score(prospect),
        time_to_decision: time_to_decision_score(prospect, engagement, now),
        referral_source: referral_source_score(prospect),
        broker_interactions: broker_interactions_score(engagement),
    };

    let lead_score = (factors.has_complete_info
        + factors.has_rut
        + factors.activity_level
        + factors.properties_viewed
        + factors.response_time
        + factors.share_opens
        + factors.budget
        + factors.preferred_locations
        + factors.time_to_decision
        + factors.referral_source
        + factors.broker_interactions)
        .min(100);

    let conversion_probability = conversion_probability(lead_score, prospect);
    let recommendations = recommendations(prospect, &factors, lead_score, now);

    LeadScoreResult { lead_score, conversion_probability, factors, recommendations }
}

fn complete_info_score(prospect: &BrokerProspect) -> i32 {
    let mut score = 0;

    // Datos de contacto básicos
    if prospect.email.is_some() && prospect.phone.is_some() {
        score += 5;
    }
    if prospect.budget.is_some() {
        score += 2;
    }
    if locations_count(prospect) > 0 {
        score += 2;
    }
    if prospect.rut.is_some() {
        score += 1;
    }

    score.min(10)
}

fn rut_score(prospect: &BrokerProspect, engagement: &ProspectEngagement) -> i32 {
    if engagement.rut_verified {
        10
    } else if prospect.rut.is_some() {
        5
    } else {
        0
    }
}

fn activity_level_score(engagement: &ProspectEngagement) -> i32 {
    let count = engagement.activities.len() as f64;
    if count == 0.0 {
        return 0;
    }
    if count >= 10.0 {
        return 15;
    }
    ((count / 10.0) * 15.0).round() as i32
}

fn properties_viewed_score(engagement: &ProspectEngagement) -> i32 {
    let count = engagement.shared_properties as f64;
    if count == 0.0 {
        return 0;
    }
    if count >= 5.0 {
        return 10;
    }
    ((count / 5.0) * 10.0).round() as i32
}

// Promedio del intervalo entre actividades consecutivas: responder dentro de
// un día vale 10, más de una semana vale 0, lineal entre medio
fn response_time_score(engagement: &ProspectEngagement) -> i32 {
    let activities = &engagement.activities;
    if activities.len() < 2 {
        return 0;
    }

    let mut diffs_secs: Vec<f64> = Vec::new();
    for pair in activities.windows(2).take(9) {
        let diff = (pair[0].created_at - pair[1].created_at).num_seconds().abs() as f64;
        diffs_secs.push(diff);
    }

    let avg_days = diffs_secs.iter().sum::<f64>() / diffs_secs.len() as f64 / 86_400.0;

    if avg_days <= 1.0 {
        10
    } else if avg_days >= 7.0 {
        0
    } else {
        (10.0 - ((avg_days - 1.0) / 6.0) * 10.0).round() as i32
    }
}

fn share_opens_score(engagement: &ProspectEngagement) -> i32 {
    if engagement.shared_properties == 0 || engagement.shared_viewed == 0 {
        return 0;
    }
    if engagement.shared_viewed >= engagement.shared_properties {
        return 5;
    }
    let ratio = engagement.shared_viewed as f64 / engagement.shared_properties as f64;
    (ratio * 5.0).round() as i32
}

fn budget_score(prospect: &BrokerProspect) -> i32 {
    let Some(budget) = prospect.budget.as_ref().and_then(|b| b.as_object()) else {
        return 0;
    };
    let has_min = budget.get("min").map(|v| !v.is_null()).unwrap_or(false);
    let has_max = budget.get("max").map(|v| !v.is_null()).unwrap_or(false);

    match (has_min, has_max) {
        (true, true) => 10,
        (true, false) | (false, true) => 5,
        _ => 0,
    }
}

fn locations_count(prospect: &BrokerProspect) -> usize {
    prospect
        .preferred_locations
        .as_ref()
        .and_then(|v| v.as_array())
        .map(|a| a.len())
        .unwrap_or(0)
}

fn preferred_locations_score(prospect: &BrokerProspect) -> i32 {
    let count = locations_count(prospect);
    if count == 0 {
        return 0;
    }
    if count >= 3 {
        return 10;
    }
    ((count as f64 / 3.0) * 10.0).round() as i32
}

// Prospectos recientes con actividad alta tienen más urgencia de decidir
fn time_to_decision_score(
    prospect: &BrokerProspect,
    engagement: &ProspectEngagement,
    now: DateTime<Utc>,
) -> i32 {
    let days_since_created = (now - prospect.created_at).num_days();
    let recent_activities = engagement
        .activities
        .iter()
        .filter(|a| (now - a.created_at).num_days() <= 7)
        .count();

    if days_since_created <= 7 && recent_activities >= 3 {
        10
    } else if days_since_created <= 14 && recent_activities >= 2 {
        7
    } else if days_since_created <= 30 && recent_activities >= 1 {
        4
    } else {
        0
    }
}

// Los referidos convierten mejor que el tráfico orgánico, y este mejor que
// las campañas pagadas
fn referral_source_score(prospect: &BrokerProspect) -> i32 {
    let source = prospect.source.as_deref().unwrap_or("").to_lowercase();

    if source.contains("referral") || source.contains("referido") {
        10
    } else if source.contains("organic") || source.contains("platform") {
        7
    } else if source.contains("ad") || source.contains("campaign") {
        5
    } else {
        3
    }
}

fn broker_interactions_score(engagement: &ProspectEngagement) -> i32 {
    let count = engagement
        .activities
        .iter()
        .filter(|a| INTERACTION_TYPES.contains(&a.activity_type.as_str()))
        .count() as f64;

    if count == 0.0 {
        return 0;
    }
    if count >= 5.0 {
        return 10;
    }
    ((count / 5.0) * 10.0).round() as i32
}

fn conversion_probability(lead_score: i32, prospect: &BrokerProspect) -> i32 {
    let mut probability = lead_score as f64;

    let status_multiplier = match prospect.status {
        ProspectStatus::New => 0.3,
        ProspectStatus::Contacted => 0.5,
        ProspectStatus::Qualified => 0.7,
        ProspectStatus::MeetingScheduled => 0.85,
        ProspectStatus::ProposalSent => 0.9,
        ProspectStatus::Negotiating => 0.95,
        _ => 0.5,
    };
    probability *= status_multiplier;

    probability += match prospect.priority {
        ProspectPriority::Urgent => 10.0,
        ProspectPriority::High => 5.0,
        ProspectPriority::Medium => 0.0,
        ProspectPriority::Low => -5.0,
    };

    // Los leads de propietarios tienden a convertir mejor
    if prospect.prospect_type == ProspectType::OwnerLead {
        probability *= 1.1;
    }

    probability.round().clamp(0.0, 100.0) as i32
}

fn recommendations(
    prospect: &BrokerProspect,
    factors: &LeadScoreFactors,
    lead_score: i32,
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut recs: Vec<String> = Vec::new();

    if lead_score >= 80 {
        recs.push("Lead caliente: contactar de inmediato".into());
        recs.push("Agendar una reunión presencial lo antes posible".into());
    } else if lead_score >= 60 {
        recs.push("Lead prometedor: mantener seguimiento activo".into());
        recs.push("Compartir propiedades que calcen con sus preferencias".into());
    } else if lead_score >= 40 {
        recs.push("Lead tibio: requiere más calificación".into());
        recs.push("Llamar para entender mejor sus necesidades".into());
    } else {
        recs.push("Lead frío: nurturing de largo plazo".into());
    }

    if factors.has_complete_info < 5 {
        recs.push("Completar la información del prospecto".into());
    }
    if factors.budget < 5 {
        recs.push("Definir el presupuesto del cliente".into());
    }
    if factors.preferred_locations < 5 {
        recs.push("Identificar las comunas de interés".into());
    }
    if factors.properties_viewed == 0 {
        recs.push("Compartir propiedades relevantes".into());
    }
    if factors.broker_interactions < 5 {
        recs.push("Aumentar la frecuencia de contacto".into());
    }

    let days_without_contact = prospect
        .last_contact_date
        .map(|d| (now - d).num_days())
        .unwrap_or(i64::MAX);
    if days_without_contact > 7 {
        recs.push("Más de 7 días sin contacto: seguimiento urgente".into());
    }

    recs.truncate(5);
    recs
}

// =============================================================================
//  SERVICIO (arma la foto desde los repos y persiste el resultado)
// =============================================================================

#[derive(Clone)]
pub struct LeadScoringService {
    prospect_repo: ProspectRepository,
}

impl LeadScoringService {
    pub fn new(prospect_repo: ProspectRepository) -> Self {
        Self { prospect_repo }
    }

    pub async fn calculate(&self, prospect: &BrokerProspect) -> Result<LeadScoreResult, AppError> {
        let engagement = self.gather_engagement(prospect).await?;
        Ok(compute_lead_score(prospect, &engagement, Utc::now()))
    }

    // Recalcula y persiste el score de un prospecto
    pub async fn recalculate_and_persist(
        &self,
        prospect: &BrokerProspect,
    ) -> Result<LeadScoreResult, AppError> {
        let result = self.calculate(prospect).await?;
        self.prospect_repo
            .persist_score(prospect.id, result.lead_score, result.conversion_probability)
            .await?;

        tracing::info!(
            prospect_id = %prospect.id,
            lead_score = result.lead_score,
            conversion_probability = result.conversion_probability,
            "Lead score actualizado"
        );
        Ok(result)
    }

    // Recalcula los prospectos no terminales de un corredor; las fallas por
    // prospecto se registran y no cortan el barrido
    pub async fn recalculate_all(&self, broker_id: Uuid) -> Result<usize, AppError> {
        let ids = self.prospect_repo.ids_for_rescore(broker_id).await?;

        let mut updated = 0;
        for id in ids {
            let Some(prospect) = self.prospect_repo.find_by_id(id).await? else {
                continue;
            };
            match self.recalculate_and_persist(&prospect).await {
                Ok(_) => updated += 1,
                Err(e) => {
                    tracing::error!(prospect_id = %id, "Error actualizando score: {}", e);
                }
            }
        }

        tracing::info!(broker_id = %broker_id, total_updated = updated, "Scores recalculados");
        Ok(updated)
    }

    async fn gather_engagement(
        &self,
        prospect: &BrokerProspect,
    ) -> Result<ProspectEngagement, AppError> {
        let activities = self.prospect_repo.activity_signals(prospect.id).await?;
        let (shared_properties, shared_viewed) =
            self.prospect_repo.shared_property_counts(prospect.id).await?;
        let rut_verified = match prospect.user_id {
            Some(user_id) => self.prospect_repo.user_rut_verified(user_id).await?,
            None => false,
        };

        Ok(ProspectEngagement { activities, shared_properties, shared_viewed, rut_verified })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn prospect_base(now: DateTime<Utc>) -> BrokerProspect {
        BrokerProspect {
            id: Uuid::new_v4(),
            broker_id: Uuid::new_v4(),
            user_id: None,
            name: "Prospecto de prueba".into(),
            email: None,
            phone: None,
            rut: None,
            prospect_type: ProspectType::TenantLead,
            status: ProspectStatus::New,
            priority: ProspectPriority::Medium,
            source: None,
            budget: None,
            preferred_locations: None,
            notes: None,
            lead_score: 0,
            conversion_probability: 0,
            contact_count: 0,
            last_contact_date: Some(now),
            next_follow_up_date: None,
            converted_at: None,
            lost_reason: None,
            converted_client_id: None,
            created_at: now - Duration::days(60),
            updated_at: now,
        }
    }

    fn activity(now: DateTime<Utc>, hours_ago: i64, kind: &str) -> ActivitySignal {
        ActivitySignal {
            activity_type: kind.into(),
            created_at: now - Duration::hours(hours_ago),
        }
    }

    #[test]
    fn prospecto_sin_senales_puntua_bajo() {
        let now = Utc::now();
        let prospect = prospect_base(now);
        let result = compute_lead_score(&prospect, &ProspectEngagement::default(), now);

        // Solo queda el piso del factor de origen desconocido
        assert_eq!(result.factors.referral_source, 3);
        assert_eq!(result.lead_score, 3);
        assert!(result.recommendations.iter().any(|r| r.contains("frío")));
    }

    #[test]
    fn prospecto_completo_llega_al_techo_de_100() {
        let now = Utc::now();
        let mut prospect = prospect_base(now);
        prospect.email = Some("lead@rent360.cl".into());
        prospect.phone = Some("+56911112222".into());
        prospect.rut = Some("11.111.111-1".into());
        prospect.budget = Some(json!({"min": 400_000, "max": 900_000}));
        prospect.preferred_locations = Some(json!(["Providencia", "Ñuñoa", "Las Condes"]));
        prospect.source = Some("referral".into());
        prospect.created_at = now - Duration::days(3);

        // Diez actividades de contacto directo separadas por pocas horas
        let activities: Vec<ActivitySignal> =
            (0..10).map(|i| activity(now, i * 3, "call")).collect();
        let engagement = ProspectEngagement {
            activities,
            shared_properties: 6,
            shared_viewed: 6,
            rut_verified: true,
        };

        let result = compute_lead_score(&prospect, &engagement, now);

        assert_eq!(result.factors.has_rut, 10);
        assert_eq!(result.factors.activity_level, 15);
        assert_eq!(result.factors.properties_viewed, 10);
        assert_eq!(result.factors.response_time, 10);
        assert_eq!(result.factors.share_opens, 5);
        assert_eq!(result.factors.budget, 10);
        assert_eq!(result.factors.referral_source, 10);
        assert_eq!(result.factors.time_to_decision, 10);
        assert_eq!(result.lead_score, 100);
    }

    #[test]
    fn probabilidad_usa_multiplicador_de_estado_y_bono_de_prioridad() {
        let now = Utc::now();
        let mut prospect = prospect_base(now);
        prospect.status = ProspectStatus::Negotiating;
        prospect.priority = ProspectPriority::Urgent;

        // score 3 (solo origen) => 3 * 0.95 + 10 = 12.85 -> 13
        let result = compute_lead_score(&prospect, &ProspectEngagement::default(), now);
        assert_eq!(result.conversion_probability, 13);
    }

    #[test]
    fn leads_de_propietario_reciben_el_multiplicador() {
        let now = Utc::now();
        let mut tenant = prospect_base(now);
        tenant.status = ProspectStatus::Qualified;
        tenant.priority = ProspectPriority::Medium;

        let mut owner = prospect_base(now);
        owner.status = ProspectStatus::Qualified;
        owner.priority = ProspectPriority::Medium;
        owner.prospect_type = ProspectType::OwnerLead;

        let engagement = ProspectEngagement {
            activities: (0..10).map(|i| activity(now, i * 3, "call")).collect(),
            shared_properties: 5,
            shared_viewed: 5,
            rut_verified: false,
        };

        let p_tenant = compute_lead_score(&tenant, &engagement, now).conversion_probability;
        let p_owner = compute_lead_score(&owner, &engagement, now).conversion_probability;
        assert!(p_owner > p_tenant);
    }

    #[test]
    fn probabilidad_queda_acotada_a_100() {
        let now = Utc::now();
        let mut prospect = prospect_base(now);
        prospect.email = Some("lead@rent360.cl".into());
        prospect.phone = Some("+56911112222".into());
        prospect.rut = Some("11.111.111-1".into());
        prospect.budget = Some(json!({"min": 1, "max": 2}));
        prospect.preferred_locations = Some(json!(["A", "B", "C"]));
        prospect.source = Some("referido".into());
        prospect.status = ProspectStatus::Negotiating;
        prospect.priority = ProspectPriority::Urgent;
        prospect.prospect_type = ProspectType::OwnerLead;
        prospect.created_at = now - Duration::days(2);

        let engagement = ProspectEngagement {
            activities: (0..12).map(|i| activity(now, i * 2, "meeting")).collect(),
            shared_properties: 8,
            shared_viewed: 8,
            rut_verified: true,
        };

        let result = compute_lead_score(&prospect, &engagement, now);
        assert_eq!(result.lead_score, 100);
        // 100 * 0.95 + 10 = 105, ×1.1 = 115.5 -> acotado
        assert_eq!(result.conversion_probability, 100);
    }

    #[test]
    fn presupuesto_parcial_vale_la_mitad() {
        let now = Utc::now();
        let mut prospect = prospect_base(now);
        prospect.budget = Some(json!({"max": 700_000}));

        let result = compute_lead_score(&prospect, &ProspectEngagement::default(), now);
        assert_eq!(result.factors.budget, 5);
    }

    #[test]
    fn nunca_entrega_mas_de_cinco_recomendaciones() {
        let now = Utc::now();
        let mut prospect = prospect_base(now);
        prospect.last_contact_date = Some(now - Duration::days(30));

        let result = compute_lead_score(&prospect, &ProspectEngagement::default(), now);
        assert!(result.recommendations.len() <= 5);
    }
}
