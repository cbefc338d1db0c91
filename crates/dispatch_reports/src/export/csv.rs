use dispatch_core::chaining::ChainedTripOpportunity;

pub(crate) fn export_opportunities_impl(
    opportunities: &[ChainedTripOpportunity],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "opportunity_id",
        "route_type",
        "chaining_kind",
        "request_count",
        "stop_count",
        "total_distance_miles",
        "total_time_secs",
        "deadhead_miles",
        "miles_saved",
        "units_saved",
        "revenue_potential",
        "revenue_increase",
        "optimization_score",
        "temporal_efficiency",
        "geographic_efficiency",
        "window_earliest_ms",
        "window_latest_ms",
    ])?;

    for opportunity in opportunities {
        wtr.write_record([
            opportunity.id.0.to_string(),
            opportunity.route_type.label().to_string(),
            opportunity.chaining.kind.label().to_string(),
            opportunity.requests.len().to_string(),
            opportunity.stops.len().to_string(),
            format!("{:.2}", opportunity.total_distance_miles),
            format!("{:.0}", opportunity.total_time_secs),
            format!("{:.2}", opportunity.chaining.deadhead_miles),
            format!("{:.2}", opportunity.miles_saved),
            opportunity.units_saved.to_string(),
            opportunity.revenue_potential.to_string(),
            opportunity.revenue_increase.to_string(),
            format!("{:.1}", opportunity.optimization_score),
            format!("{:.1}", opportunity.temporal_efficiency),
            format!("{:.1}", opportunity.geographic_efficiency),
            opportunity.window.earliest_ms.to_string(),
            opportunity.window.latest_ms.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
