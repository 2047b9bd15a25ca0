// src/services/payout_service.rs
//
// Agregación de payouts para runners y proveedores. Sin ledger ni llave de
// idempotencia: cada llamada recalcula en fresco desde las filas fuente y la
// paginación se aplica después de agregar el período completo en memoria.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::{
        payout_repo::{CompletedJobRow, CompletedVisitRow},
        PayoutRepository,
    },
    models::{
        notification::{NotificationKind, NotificationPriority},
        payout::{PayoutCalculation, PayoutItem, PayoutPeriod, PayoutReport},
    },
    services::notification_service::{NotificationService, NotifyParams},
};

// Proveedores dentro del período de gracia no pagan comisión de plataforma
const PROVIDER_GRACE_PERIOD_DAYS: i64 = 15;
const PROVIDER_COMMISSION_PCT: u32 = 10;
// Montos netos bajo este mínimo no generan payout
const MINIMUM_PROVIDER_PAYOUT: u32 = 10_000;

// Suma las ganancias de visitas completadas, agrupadas por runner en el
// orden en que aparecen. Cero visitas completadas produce una lista vacía.
pub fn aggregate_runner_payouts(
    rows: &[CompletedVisitRow],
    period: PayoutPeriod,
) -> Vec<PayoutCalculation> {
    let mut payouts: Vec<PayoutCalculation> = Vec::new();

    for row in rows {
        let item = PayoutItem {
            reference_id: row.visit_id,
            amount: row.earnings,
            date: row.completed_at,
            description: format!("Visita en {}", row.property_address),
        };

        match payouts.iter_mut().find(|p| p.recipient_id == row.runner_id) {
            Some(payout) => {
                payout.gross_amount += row.earnings;
                payout.net_amount += row.earnings;
                payout.items.push(item);
            }
            None => payouts.push(PayoutCalculation {
                recipient_id: row.runner_id,
                recipient_name: row.runner_name.clone(),
                recipient_email: row.runner_email.clone(),
                gross_amount: row.earnings,
                platform_fee: Decimal::ZERO,
                net_amount: row.earnings,
                period,
                items: vec![item],
            }),
        }
    }

    payouts
}

// Igual que arriba sobre trabajos completados, con dos ajustes por proveedor:
// 0% de comisión dentro del período de gracia (10% después) y descarte de
// los netos bajo el mínimo.
pub fn aggregate_provider_payouts(
    rows: &[CompletedJobRow],
    period: PayoutPeriod,
) -> Vec<PayoutCalculation> {
    let mut payouts: Vec<PayoutCalculation> = Vec::new();

    for row in rows {
        let item = PayoutItem {
            reference_id: row.job_id,
            amount: row.final_price,
            date: row.completed_at,
            description: format!("Trabajo de {}", row.job_type),
        };

        match payouts.iter_mut().find(|p| p.recipient_id == row.provider_id) {
            Some(payout) => {
                payout.gross_amount += row.final_price;
                payout.items.push(item);
            }
            None => payouts.push(PayoutCalculation {
                recipient_id: row.provider_id,
                recipient_name: row.provider_name.clone(),
                recipient_email: row.provider_email.clone(),
                gross_amount: row.final_price,
                platform_fee: Decimal::ZERO,
                net_amount: Decimal::ZERO,
                period,
                items: vec![item],
            }),
        }
    }

    let minimum = Decimal::from(MINIMUM_PROVIDER_PAYOUT);
    let mut result: Vec<PayoutCalculation> = Vec::new();

    for mut payout in payouts {
        let since = rows
            .iter()
            .find(|r| r.provider_id == payout.recipient_id)
            .map(|r| r.provider_since)
            .unwrap_or(period.end_date);
        let days_since_registration = (period.end_date - since).num_days();

        let commission_pct = if days_since_registration <= PROVIDER_GRACE_PERIOD_DAYS {
            Decimal::ZERO
        } else {
            Decimal::from(PROVIDER_COMMISSION_PCT)
        };

        payout.platform_fee = payout.gross_amount * commission_pct / Decimal::ONE_HUNDRED;
        payout.net_amount = payout.gross_amount - payout.platform_fee;

        if payout.net_amount >= minimum {
            result.push(payout);
        }
    }

    result
}

#[derive(Clone)]
pub struct PayoutService {
    repo: PayoutRepository,
    notifications: NotificationService,
}

impl PayoutService {
    pub fn new(repo: PayoutRepository, notifications: NotificationService) -> Self {
        Self { repo, notifications }
    }

    // Sin fechas, el período queda abierto hacia atrás ("pendiente")
    fn period(start_date: Option<DateTime<Utc>>, end_date: Option<DateTime<Utc>>) -> PayoutPeriod {
        PayoutPeriod {
            start_date,
            end_date: end_date.unwrap_or_else(Utc::now),
        }
    }

    pub async fn runner_report(
        &self,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<PayoutReport, AppError> {
        let period = Self::period(start_date, end_date);
        let rows = self
            .repo
            .completed_visits_in_period(period.start_date, period.end_date)
            .await?;
        let payouts = aggregate_runner_payouts(&rows, period);
        Ok(Self::report(payouts, period))
    }

    pub async fn provider_report(
        &self,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<PayoutReport, AppError> {
        let period = Self::period(start_date, end_date);
        let rows = self
            .repo
            .completed_jobs_in_period(period.start_date, period.end_date)
            .await?;
        let payouts = aggregate_provider_payouts(&rows, period);
        Ok(Self::report(payouts, period))
    }

    // El POST además notifica a cada destinatario. Repetir la llamada vuelve
    // a calcular y a notificar: no hay llave de idempotencia entre corridas.
    pub async fn process_runner_payouts(
        &self,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<PayoutReport, AppError> {
        let report = self.runner_report(start_date, end_date).await?;
        self.notify_recipients(&report).await;
        Ok(report)
    }

    pub async fn process_provider_payouts(
        &self,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<PayoutReport, AppError> {
        let report = self.provider_report(start_date, end_date).await?;
        self.notify_recipients(&report).await;
        Ok(report)
    }

    async fn notify_recipients(&self, report: &PayoutReport) {
        for payout in &report.payouts {
            self.notifications
                .notify(
                    NotifyParams::new(
                        payout.recipient_id,
                        NotificationKind::PayoutReady,
                        "Pago disponible",
                        &format!(
                            "Tienes un pago de ${} listo por {} trabajos del período.",
                            payout.net_amount,
                            payout.items.len()
                        ),
                    )
                    .with_priority(NotificationPriority::High),
                )
                .await;
        }
    }

    fn report(payouts: Vec<PayoutCalculation>, period: PayoutPeriod) -> PayoutReport {
        let total_amount = payouts.iter().map(|p| p.net_amount).sum();
        PayoutReport {
            total_recipients: payouts.len(),
            total_amount,
            period,
            payouts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn period(now: DateTime<Utc>) -> PayoutPeriod {
        PayoutPeriod { start_date: None, end_date: now }
    }

    fn visit(runner: (Uuid, &str), earnings: i64, now: DateTime<Utc>) -> CompletedVisitRow {
        CompletedVisitRow {
            visit_id: Uuid::new_v4(),
            runner_id: runner.0,
            runner_name: runner.1.into(),
            runner_email: format!("{}@rent360.cl", runner.1),
            earnings: Decimal::from(earnings),
            completed_at: now - Duration::days(1),
            property_address: "Av. Apoquindo 1234".into(),
        }
    }

    fn job(
        provider: (Uuid, &str),
        price: i64,
        since_days: i64,
        now: DateTime<Utc>,
    ) -> CompletedJobRow {
        CompletedJobRow {
            job_id: Uuid::new_v4(),
            provider_id: provider.0,
            provider_name: provider.1.into(),
            provider_email: format!("{}@rent360.cl", provider.1),
            provider_since: now - Duration::days(since_days),
            final_price: Decimal::from(price),
            completed_at: now - Duration::days(1),
            job_type: "gasfitería".into(),
        }
    }

    #[test]
    fn periodo_sin_visitas_da_lista_vacia_y_total_cero() {
        let now = Utc::now();
        let payouts = aggregate_runner_payouts(&[], period(now));
        assert!(payouts.is_empty());

        let total: Decimal = payouts.iter().map(|p| p.net_amount).sum();
        assert_eq!(total, Decimal::ZERO);
    }

    #[test]
    fn agrupa_visitas_por_runner() {
        let now = Utc::now();
        let ana = (Uuid::new_v4(), "ana");
        let beto = (Uuid::new_v4(), "beto");

        let rows = vec![
            visit(ana, 12_000, now),
            visit(beto, 8_000, now),
            visit(ana, 5_500, now),
        ];
        let payouts = aggregate_runner_payouts(&rows, period(now));

        assert_eq!(payouts.len(), 2);
        let de_ana = payouts.iter().find(|p| p.recipient_id == ana.0).unwrap();
        assert_eq!(de_ana.gross_amount, Decimal::from(17_500));
        assert_eq!(de_ana.net_amount, Decimal::from(17_500));
        assert_eq!(de_ana.items.len(), 2);
        // Los runners no pagan comisión de plataforma
        assert_eq!(de_ana.platform_fee, Decimal::ZERO);
    }

    #[test]
    fn proveedor_en_periodo_de_gracia_no_paga_comision() {
        let now = Utc::now();
        let nuevo = (Uuid::new_v4(), "nuevo");

        let rows = vec![job(nuevo, 100_000, 10, now)];
        let payouts = aggregate_provider_payouts(&rows, period(now));

        assert_eq!(payouts.len(), 1);
        assert_eq!(payouts[0].platform_fee, Decimal::ZERO);
        assert_eq!(payouts[0].net_amount, Decimal::from(100_000));
    }

    #[test]
    fn proveedor_antiguo_paga_el_diez_por_ciento() {
        let now = Utc::now();
        let antiguo = (Uuid::new_v4(), "antiguo");

        let rows = vec![job(antiguo, 100_000, 200, now)];
        let payouts = aggregate_provider_payouts(&rows, period(now));

        assert_eq!(payouts[0].platform_fee, Decimal::from(10_000));
        assert_eq!(payouts[0].net_amount, Decimal::from(90_000));
    }

    #[test]
    fn netos_bajo_el_minimo_quedan_fuera() {
        let now = Utc::now();
        let chico = (Uuid::new_v4(), "chico");
        let grande = (Uuid::new_v4(), "grande");

        let rows = vec![job(chico, 9_000, 200, now), job(grande, 50_000, 200, now)];
        let payouts = aggregate_provider_payouts(&rows, period(now));

        assert_eq!(payouts.len(), 1);
        assert_eq!(payouts[0].recipient_id, grande.0);
    }

    #[test]
    fn varios_trabajos_del_mismo_proveedor_se_suman_antes_de_la_comision() {
        let now = Utc::now();
        let prov = (Uuid::new_v4(), "prov");

        let rows = vec![job(prov, 30_000, 200, now), job(prov, 20_000, 200, now)];
        let payouts = aggregate_provider_payouts(&rows, period(now));

        assert_eq!(payouts.len(), 1);
        assert_eq!(payouts[0].gross_amount, Decimal::from(50_000));
        assert_eq!(payouts[0].platform_fee, Decimal::from(5_000));
        assert_eq!(payouts[0].items.len(), 2);
    }
}
