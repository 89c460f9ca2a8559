use actix_web::{http::header, http::StatusCode, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::models::{
    catalog::{VehicleClass, VehicleType},
    itinerary::{check_snapshot, resolve_title, SaveItineraryInput},
    trip::{ItineraryResult, TripParameters, TripRequest},
};
use crate::routes::error_response;
use crate::services::{
    catalog_service::CatalogSource,
    export_service::{attachment_filename, renderer_for, DocumentRenderer, ItineraryDocument},
    itinerary_synthesis_service::{synthesize_with, validate, SynthesisError, TransportCostPolicy},
};

#[derive(Deserialize)]
pub struct OptionsQuery {
    guests: Option<u32>,
}

/// `?format=txt` for plain text, PDF otherwise.
#[derive(Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VehicleOption {
    #[serde(flatten)]
    pub vehicle_type: VehicleType,
    pub classes: Vec<VehicleClass>,
}

/// Validation failures are 400, an empty hotel or vehicle match is 422.
pub fn synthesis_error_response(err: &SynthesisError) -> HttpResponse {
    let status = if err.is_validation() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    error_response(status, err.to_string())
}

/// Loads a fresh catalog and runs the planner once.
pub async fn plan_trip(
    source: &dyn CatalogSource,
    policy: &dyn TransportCostPolicy,
    request: &TripRequest,
) -> Result<ItineraryResult, SynthesisError> {
    let catalog = source.load_catalog().await;
    synthesize_with(request, &catalog, policy)
}

/// Renders the plan as a downloadable document.
pub fn attachment_response(
    title: &str,
    params: &TripParameters,
    result: &ItineraryResult,
    renderer: &dyn DocumentRenderer,
) -> HttpResponse {
    let document = ItineraryDocument::from_result(title, params, result);
    let filename = attachment_filename(title, renderer.file_extension());

    match renderer.render(&document) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type(renderer.content_type())
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ))
            .body(bytes),
        Err(err) => {
            log::error!("Failed to render {}: {:?}", filename, err);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to render itinerary",
            )
        }
    }
}

pub async fn get_catalog(source: web::Data<dyn CatalogSource>) -> impl Responder {
    HttpResponse::Ok().json(source.load_catalog().await)
}

pub async fn get_options(
    source: web::Data<dyn CatalogSource>,
    params: web::Query<OptionsQuery>,
) -> impl Responder {
    let guests = match params.guests {
        Some(guests) if guests >= 1 => guests,
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                SynthesisError::GuestsOutOfRange.to_string(),
            )
        }
    };

    let catalog = source.load_catalog().await;
    let options: Vec<VehicleOption> = catalog
        .offerable_vehicle_types(guests)
        .into_iter()
        .map(|vehicle_type| VehicleOption {
            classes: catalog
                .classes_for_type(&vehicle_type.name)
                .into_iter()
                .cloned()
                .collect(),
            vehicle_type: vehicle_type.clone(),
        })
        .collect();

    HttpResponse::Ok().json(options)
}

pub async fn generate(
    source: web::Data<dyn CatalogSource>,
    policy: web::Data<dyn TransportCostPolicy>,
    input: web::Json<TripRequest>,
) -> impl Responder {
    match plan_trip(source.get_ref(), policy.get_ref(), &input).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(err) => synthesis_error_response(&err),
    }
}

/// Exports the itinerary sent with the request, or plans one when none is
/// attached.
pub async fn export(
    source: web::Data<dyn CatalogSource>,
    policy: web::Data<dyn TransportCostPolicy>,
    query: web::Query<ExportQuery>,
    input: web::Json<SaveItineraryInput>,
) -> impl Responder {
    let input = input.into_inner();

    let params = match validate(&input.request) {
        Ok(params) => params,
        Err(err) => return synthesis_error_response(&err),
    };
    let title = resolve_title(input.title.as_deref(), params.days);

    let result = match input.itinerary {
        Some(itinerary) => match check_snapshot(&params, &itinerary) {
            Ok(()) => itinerary,
            Err(err) => return error_response(StatusCode::BAD_REQUEST, err.to_string()),
        },
        None => match plan_trip(source.get_ref(), policy.get_ref(), &input.request).await {
            Ok(result) => result,
            Err(err) => return synthesis_error_response(&err),
        },
    };

    let renderer = renderer_for(query.format.as_deref());
    attachment_response(&title, &params, &result, renderer.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::HotelCategory;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            synthesis_error_response(&SynthesisError::NoInterests).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            synthesis_error_response(&SynthesisError::NoHotelsFound {
                category: HotelCategory::Luxury
            })
            .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
