//! Derived reporting structures for one chaining opportunity.
//!
//! [`build_report`] is a pure function over the opportunity: no partition
//! access, no clock. The baseline side of the comparison is synthetic — it
//! reconstructs the "before" state by adding the computed savings back onto
//! the optimized route, it is not a measured control group.

use serde::{Deserialize, Serialize};

use dispatch_core::chaining::{ChainedTripOpportunity, OpportunityId, RouteType};
use dispatch_core::matching::revenue::PER_MILE_OPERATING_COST;
use dispatch_core::model::TimeWindow;

/// Assumed fleet fuel efficiency, miles per gallon.
pub const FUEL_EFFICIENCY_MPG: f64 = 8.0;

/// Assumed diesel price per gallon.
pub const FUEL_PRICE_PER_GALLON: f64 = 3.50;

/// CO₂ emitted per road mile, kilograms.
pub const CARBON_KG_PER_MILE: f64 = 0.404;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub opportunity: OpportunityId,
    pub route_type: RouteType,
    pub request_count: usize,
    pub stop_count: usize,
    pub window: TimeWindow,
    pub optimization_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialAnalysis {
    pub revenue_potential: u64,
    pub revenue_increase: u64,
    pub operating_cost: f64,
    pub fuel_savings: f64,
    pub profit: f64,
    /// Percent of revenue retained after operating cost; zero when there is
    /// no revenue.
    pub profit_margin_pct: f64,
    /// Savings returned per unit of operating cost, in percent; zero when
    /// the route costs nothing.
    pub roi_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationalMetrics {
    pub total_distance_miles: f64,
    pub total_time_secs: f64,
    pub deadhead_miles: f64,
    pub miles_saved: f64,
    pub units_saved: u32,
    pub carbon_reduction_kg: f64,
    pub temporal_efficiency: f64,
    pub geographic_efficiency: f64,
}

/// Baseline-vs-optimized comparison. The baseline equals optimized plus the
/// known savings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonData {
    pub baseline_miles: f64,
    pub optimized_miles: f64,
    pub baseline_operating_cost: f64,
    pub optimized_operating_cost: f64,
    pub baseline_units: u32,
    pub optimized_units: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteReport {
    pub summary: ReportSummary,
    pub financial: FinancialAnalysis,
    pub operational: OperationalMetrics,
    pub comparison: ComparisonData,
}

/// Build the full report for one opportunity.
pub fn build_report(opportunity: &ChainedTripOpportunity) -> RouteReport {
    let operating_cost = opportunity.total_distance_miles * PER_MILE_OPERATING_COST;
    let fuel_savings = opportunity.miles_saved / FUEL_EFFICIENCY_MPG * FUEL_PRICE_PER_GALLON;
    let carbon_reduction_kg = opportunity.miles_saved * CARBON_KG_PER_MILE;

    let revenue = opportunity.revenue_potential as f64;
    let profit = revenue - operating_cost;
    let profit_margin_pct = if revenue > 0.0 {
        profit / revenue * 100.0
    } else {
        0.0
    };
    let roi_pct = if operating_cost > 0.0 {
        (opportunity.revenue_increase as f64 + fuel_savings) / operating_cost * 100.0
    } else {
        0.0
    };

    // A chained route runs on one unit; the synthetic baseline adds back the
    // shifts the chain saved.
    let optimized_units = 1;
    let baseline_units = optimized_units + opportunity.units_saved;

    RouteReport {
        summary: ReportSummary {
            opportunity: opportunity.id,
            route_type: opportunity.route_type,
            request_count: opportunity.requests.len(),
            stop_count: opportunity.stops.len(),
            window: opportunity.window,
            optimization_score: opportunity.optimization_score,
        },
        financial: FinancialAnalysis {
            revenue_potential: opportunity.revenue_potential,
            revenue_increase: opportunity.revenue_increase,
            operating_cost,
            fuel_savings,
            profit,
            profit_margin_pct,
            roi_pct,
        },
        operational: OperationalMetrics {
            total_distance_miles: opportunity.total_distance_miles,
            total_time_secs: opportunity.total_time_secs,
            deadhead_miles: opportunity.chaining.deadhead_miles,
            miles_saved: opportunity.miles_saved,
            units_saved: opportunity.units_saved,
            carbon_reduction_kg,
            temporal_efficiency: opportunity.temporal_efficiency,
            geographic_efficiency: opportunity.geographic_efficiency,
        },
        comparison: ComparisonData {
            baseline_miles: opportunity.total_distance_miles + opportunity.miles_saved,
            optimized_miles: opportunity.total_distance_miles,
            baseline_operating_cost: operating_cost
                + opportunity.miles_saved * PER_MILE_OPERATING_COST,
            optimized_operating_cost: operating_cost,
            baseline_units,
            optimized_units,
        },
    }
}

/// A small, fully populated opportunity shared by this crate's tests.
#[cfg(test)]
pub(crate) fn sample_opportunity() -> ChainedTripOpportunity {
    use dispatch_core::chaining::{ChainingDetails, ChainingKind, RouteStop, StopKind};
    use dispatch_core::model::{FacilityId, RequestId};

    let cell = h3o::CellIndex::try_from(0x8a1fb46622dffff).expect("cell");
    let stop = |request: u64, facility: u64, kind| RouteStop {
        request: RequestId(request),
        facility: FacilityId(facility),
        cell,
        kind,
    };
    ChainedTripOpportunity {
        id: OpportunityId(1),
        route_type: RouteType::ReturnTrip,
        requests: vec![RequestId(1), RequestId(2)],
        stops: vec![
            stop(1, 1, StopKind::Pickup),
            stop(1, 2, StopKind::Dropoff),
            stop(2, 2, StopKind::Pickup),
            stop(2, 1, StopKind::Dropoff),
        ],
        total_distance_miles: 40.0,
        total_time_secs: 3_200.0,
        miles_saved: 40.0,
        units_saved: 1,
        revenue_potential: 600,
        revenue_increase: 100,
        optimization_score: 50.0,
        window: TimeWindow::new(0, 7_200_000),
        temporal_efficiency: 75.0,
        geographic_efficiency: 100.0,
        chaining: ChainingDetails {
            kind: ChainingKind::ReturnTrip,
            deadhead_miles: 0.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn financial_math_follows_the_fixed_constants() {
        let report = build_report(&sample_opportunity());

        // 40 miles at $2.50/mile.
        assert_eq!(report.financial.operating_cost, 100.0);
        // 40 miles saved / 8 mpg * $3.50.
        assert_eq!(report.financial.fuel_savings, 17.5);
        assert_eq!(report.operational.carbon_reduction_kg, 40.0 * 0.404);
        // (100 + 17.5) / 100 * 100.
        assert_eq!(report.financial.roi_pct, 117.5);
        // (600 - 100) / 600 * 100.
        assert!((report.financial.profit_margin_pct - 83.333).abs() < 0.01);
    }

    #[test]
    fn baseline_is_optimized_plus_known_savings() {
        let report = build_report(&sample_opportunity());

        assert_eq!(report.comparison.optimized_miles, 40.0);
        assert_eq!(report.comparison.baseline_miles, 80.0);
        assert_eq!(
            report.comparison.baseline_operating_cost,
            report.comparison.optimized_operating_cost + 40.0 * PER_MILE_OPERATING_COST
        );
        assert_eq!(report.comparison.optimized_units, 1);
        assert_eq!(report.comparison.baseline_units, 2);
    }

    #[test]
    fn zero_revenue_and_zero_cost_do_not_divide_by_zero() {
        let mut opportunity = sample_opportunity();
        opportunity.revenue_potential = 0;
        opportunity.total_distance_miles = 0.0;
        let report = build_report(&opportunity);

        assert_eq!(report.financial.profit_margin_pct, 0.0);
        assert_eq!(report.financial.roi_pct, 0.0);
    }
}
