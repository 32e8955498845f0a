use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::models::reservation::{Reservation, ReservationStatus};

const GEMINI_MODEL: &str = "gemini-3-flash-preview";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub enum GeminiError {
    NotConfigured,
    HttpError(reqwest::Error),
    ResponseError(String),
}

impl std::fmt::Display for GeminiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeminiError::NotConfigured => write!(f, "GEMINI_API_KEY not set"),
            GeminiError::HttpError(err) => write!(f, "HTTP error: {}", err),
            GeminiError::ResponseError(msg) => write!(f, "Response error: {}", msg),
        }
    }
}

impl std::error::Error for GeminiError {}

impl From<reqwest::Error> for GeminiError {
    fn from(err: reqwest::Error) -> Self {
        GeminiError::HttpError(err)
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Everything the contract template needs, already formatted for display.
#[derive(Debug, Clone, Serialize)]
pub struct ContractDetails {
    pub vehicle_name: String,
    pub license_plate: String,
    pub customer_name: String,
    pub customer_address: String,
    pub customer_email: String,
    pub start_date: String,
    pub end_date: String,
    pub price: String,
    pub deposit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub summary: String,
    pub occupancy_rate: String,
    pub recommendation: String,
}

/// Best-effort text generation. When the API key is missing or the call
/// fails, callers get the deterministic local template instead; the booking
/// and contract flows never block on this collaborator.
#[derive(Clone)]
pub struct GeminiService {
    client: Client,
    api_key: Option<String>,
}

impl GeminiService {
    pub fn from_env() -> Self {
        let api_key = env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            log::info!("GEMINI_API_KEY not set; contract texts will use the local template");
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, api_key }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Rental contract text for the given details. Falls back to
    /// `local_contract_template` on any failure.
    pub async fn generate_contract(&self, details: &ContractDetails) -> String {
        match self.generate_contract_ai(details).await {
            Ok(text) => text,
            Err(err) => {
                log::warn!("Contract generation fell back to the local template: {}", err);
                local_contract_template(details)
            }
        }
    }

    async fn generate_contract_ai(&self, details: &ContractDetails) -> Result<String, GeminiError> {
        let api_key = self.api_key.as_ref().ok_or(GeminiError::NotConfigured)?;

        let prompt = format!(
            "Jsi právní asistent pro půjčovnu obytných vozů v ČR. Vytvoř profesionální, \
             právně závaznou smlouvu o nájmu obytného vozu s těmito detaily:\n\
             NÁJEMCE: {}, adresa: {}, email: {}\n\
             VOZIDLO: {}, SPZ: {}\n\
             TERMÍN: od {} do {}\n\
             CENA: {}\nKAUCE: {}\n\
             Smlouva musí obsahovat vymezení předmětu nájmu, podmínky užívání \
             (zákaz kouření, zvířata jen se souhlasem), sankce za pozdní vrácení, \
             postup při nehodě a místo předání Brno - Bohunice. \
             Piš česky, formálně a strukturovaně, bez úvodních řečí.",
            details.customer_name,
            details.customer_address,
            details.customer_email,
            details.vehicle_name,
            details.license_plate,
            details.start_date,
            details.end_date,
            details.price,
            details.deposit,
        );

        let text = self.generate(api_key, prompt, None).await?;
        if text.trim().is_empty() {
            return Err(GeminiError::ResponseError("Empty contract text".to_string()));
        }
        Ok(text)
    }

    /// Occupancy/pricing analysis for the admin dashboard. Falls back to a
    /// locally computed summary.
    pub async fn analyze_trends(&self, reservations: &[Reservation]) -> TrendAnalysis {
        match self.analyze_trends_ai(reservations).await {
            Ok(analysis) => analysis,
            Err(err) => {
                log::warn!("Trend analysis fell back to the local summary: {}", err);
                local_trend_analysis(reservations)
            }
        }
    }

    async fn analyze_trends_ai(
        &self,
        reservations: &[Reservation],
    ) -> Result<TrendAnalysis, GeminiError> {
        let api_key = self.api_key.as_ref().ok_or(GeminiError::NotConfigured)?;

        let rows: Vec<serde_json::Value> = reservations
            .iter()
            .map(|r| {
                serde_json::json!({
                    "start": r.start_date.to_string(),
                    "end": r.end_date.to_string(),
                    "price": r.total_price,
                    "status": r.status.as_str(),
                })
            })
            .collect();

        let prompt = format!(
            "Analyzuj tyto rezervace obytného vozu a vrať JSON ve tvaru \
             {{\"summary\": \"...\", \"occupancy_rate\": \"...\", \"recommendation\": \"...\"}}:\n{}",
            serde_json::to_string(&rows).unwrap_or_default()
        );

        let text = self
            .generate(api_key, prompt, Some("application/json".to_string()))
            .await?;
        serde_json::from_str(&text)
            .map_err(|err| GeminiError::ResponseError(format!("Malformed analysis JSON: {}", err)))
    }

    async fn generate(
        &self,
        api_key: &str,
        prompt: String,
        response_mime_type: Option<String>,
    ) -> Result<String, GeminiError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            GEMINI_MODEL, api_key
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: response_mime_type
                .map(|mime| GenerationConfig { response_mime_type: mime }),
        };

        let response = self.client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(GeminiError::ResponseError(format!(
                "Gemini returned status {}",
                response.status()
            )));
        }

        let body: GenerateContentResponse = response.json().await?;
        let text = body
            .candidates
            .and_then(|mut c| c.pop())
            .and_then(|c| c.content)
            .and_then(|mut c| c.parts.pop())
            .map(|p| p.text)
            .ok_or_else(|| GeminiError::ResponseError("No candidates in response".to_string()))?;
        Ok(text)
    }
}

/// Deterministic fixed-format contract used whenever the AI collaborator is
/// unavailable. Same inputs always produce the same text.
pub fn local_contract_template(details: &ContractDetails) -> String {
    format!(
        "SMLOUVA O NÁJMU OBYTNÉHO VOZU\n\
         \n\
         PRONAJÍMATEL: Milan Gula, Teslova Brno, IČO 07031653\n\
         NÁJEMCE: {customer_name}\n\
         Adresa: {customer_address}\n\
         E-mail: {customer_email}\n\
         \n\
         PŘEDMĚT NÁJMU\n\
         Vozidlo: {vehicle_name}, SPZ: {license_plate}\n\
         Termín nájmu: od {start_date} do {end_date}\n\
         Cena nájmu: {price}\n\
         Vratná kauce: {deposit}\n\
         \n\
         PODMÍNKY UŽÍVÁNÍ\n\
         1. Ve vozidle platí přísný zákaz kouření.\n\
         2. Přeprava zvířat je možná pouze s předchozím souhlasem pronajímatele.\n\
         3. Při pozdním vrácení je účtována smluvní pokuta za každý započatý den.\n\
         4. Nadměrné znečištění vozidla je zpoplatněno dle skutečných nákladů na čištění.\n\
         \n\
         POSTUP PŘI NEHODĚ\n\
         Nájemce je povinen každou nehodu neprodleně ohlásit pronajímateli a Policii ČR\n\
         a zdokumentovat ji fotograficky.\n\
         \n\
         PŘEDÁNÍ VOZIDLA\n\
         Místo předání i vrácení: Brno - Bohunice.\n",
        customer_name = details.customer_name,
        customer_address = details.customer_address,
        customer_email = details.customer_email,
        vehicle_name = details.vehicle_name,
        license_plate = details.license_plate,
        start_date = details.start_date,
        end_date = details.end_date,
        price = details.price,
        deposit = details.deposit,
    )
}

/// Locally computed stand-in for the AI analysis: occupancy is booked days
/// of non-cancelled reservations over a 365-day year.
pub fn local_trend_analysis(reservations: &[Reservation]) -> TrendAnalysis {
    let active: Vec<&Reservation> = reservations
        .iter()
        .filter(|r| r.status != ReservationStatus::Cancelled)
        .collect();
    let booked_days: i64 = active.iter().map(|r| r.rental_days()).sum();
    let revenue: i64 = active.iter().map(|r| r.total_price).sum();
    let occupancy = (booked_days * 100) / 365;

    TrendAnalysis {
        summary: format!(
            "{} aktivních rezervací, {} rezervovaných dní, tržby {} Kč.",
            active.len(),
            booked_days,
            revenue
        ),
        occupancy_rate: format!("{} %", occupancy),
        recommendation:
            "Pro AI doporučení nastavte GEMINI_API_KEY; toto je lokální souhrn.".to_string(),
    }
}
