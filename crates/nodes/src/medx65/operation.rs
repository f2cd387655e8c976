//! (resource, operation) dispatch for the MedX65 API.
//!
//! An input item names a `resource` and an `operation` plus the parameters
//! that operation needs. [`Operation::from_parameters`] turns the item into a
//! typed [`Operation`], and [`Operation::request`] resolves it to exactly one
//! [`OperationRequest`]. The method/path table lives in [`OperationKind`].

use std::fmt;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::NodeError;

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// Top-level entity category exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Agenda,
    Contact,
    Patient,
    User,
    Sector,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Agenda => "agenda",
            Resource::Contact => "contact",
            Resource::Patient => "patient",
            Resource::User => "user",
            Resource::Sector => "sector",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Dispatch table
// ---------------------------------------------------------------------------

/// Every supported (resource, operation) pair, without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    AgendaCreate,
    AgendaGet,
    AgendaGetByUser,
    AgendaGetBySector,
    ContactCreate,
    ContactGetById,
    ContactSearch,
    PatientGetAll,
    UserGetAgendaUsers,
    SectorGetAll,
    SectorGetStatusNames,
}

impl OperationKind {
    pub const ALL: [OperationKind; 11] = [
        OperationKind::AgendaCreate,
        OperationKind::AgendaGet,
        OperationKind::AgendaGetByUser,
        OperationKind::AgendaGetBySector,
        OperationKind::ContactCreate,
        OperationKind::ContactGetById,
        OperationKind::ContactSearch,
        OperationKind::PatientGetAll,
        OperationKind::UserGetAgendaUsers,
        OperationKind::SectorGetAll,
        OperationKind::SectorGetStatusNames,
    ];

    pub fn resource(self) -> Resource {
        use OperationKind::*;
        match self {
            AgendaCreate | AgendaGet | AgendaGetByUser | AgendaGetBySector => Resource::Agenda,
            ContactCreate | ContactGetById | ContactSearch => Resource::Contact,
            PatientGetAll => Resource::Patient,
            UserGetAgendaUsers => Resource::User,
            SectorGetAll | SectorGetStatusNames => Resource::Sector,
        }
    }

    /// Operation name as it appears in item parameters.
    pub fn name(self) -> &'static str {
        use OperationKind::*;
        match self {
            AgendaCreate | ContactCreate => "create",
            AgendaGet => "get",
            AgendaGetByUser => "getByUser",
            AgendaGetBySector => "getBySector",
            ContactGetById => "getById",
            ContactSearch => "search",
            PatientGetAll | SectorGetAll => "getAll",
            UserGetAgendaUsers => "getAgendaUsers",
            SectorGetStatusNames => "getStatusNames",
        }
    }

    pub fn method(self) -> Method {
        match self {
            OperationKind::AgendaCreate | OperationKind::ContactCreate => Method::POST,
            _ => Method::GET,
        }
    }

    pub fn path(self) -> &'static str {
        use OperationKind::*;
        match self {
            AgendaCreate => "/api/integration/insertagenda",
            AgendaGet => "/api/integration/GetAgenda",
            AgendaGetByUser => "/api/integration/GetAgendabyUsuario",
            AgendaGetBySector => "/api/integration/GetAgendabySetor",
            ContactCreate => "/api/integration/InsertContato",
            ContactGetById => "/api/integration/GetContatosById",
            ContactSearch => "/api/integration/GetContatosGridBySearch",
            PatientGetAll => "/api/integration/GetPacientes",
            UserGetAgendaUsers => "/api/integration/GetUsuariosAgenda",
            SectorGetAll => "/api/integration/GetSetor",
            SectorGetStatusNames => "/api/integration/GetStatusNomeAgenda",
        }
    }
}

// ---------------------------------------------------------------------------
// Operations with their parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

fn default_status() -> i64 {
    1
}

/// Host number fields may arrive float-encoded (`7.0`). Integral values are
/// accepted as-is; fractional ones are rejected.
fn integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(n) = number.as_i64() {
        return Ok(n);
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
        _ => Err(serde::de::Error::custom(format!(
            "invalid number {number}, expected an integer"
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(
    tag = "operation",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum AgendaOperation {
    Create {
        #[serde(deserialize_with = "integer")]
        user_id: i64,
        start_date: String,
        end_date: String,
        description: String,
        #[serde(default = "default_status", deserialize_with = "integer")]
        status: i64,
        #[serde(default, deserialize_with = "integer")]
        linked_to: i64,
    },
    Get {
        start_date: String,
        end_date: String,
    },
    GetByUser {
        start_date: String,
        end_date: String,
        #[serde(deserialize_with = "integer")]
        user_id: i64,
    },
    GetBySector {
        start_date: String,
        end_date: String,
        sector: String,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(
    tag = "operation",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ContactOperation {
    Create {
        name: String,
        #[serde(default)]
        email: String,
        #[serde(default)]
        mobile_phone: String,
        #[serde(default)]
        cpf_cgc: String,
        #[serde(default)]
        birth_date: String,
        #[serde(default)]
        gender: Gender,
    },
    GetById {
        contact_id: String,
    },
    Search {
        search_term: String,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum PatientOperation {
    GetAll,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum UserOperation {
    GetAgendaUsers,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum SectorOperation {
    GetAll,
    GetStatusNames,
}

/// A fully-parameterised operation resolved from one input item.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Agenda(AgendaOperation),
    Contact(ContactOperation),
    Patient(PatientOperation),
    User(UserOperation),
    Sector(SectorOperation),
}

/// Request body for `insertagenda`.
#[derive(Serialize)]
struct InsertAgendaBody<'a> {
    #[serde(rename = "Id_do_Usuario")]
    user_id: i64,
    #[serde(rename = "Inicio")]
    start: &'a str,
    #[serde(rename = "Final")]
    end: &'a str,
    #[serde(rename = "Descricao")]
    description: &'a str,
    #[serde(rename = "Status")]
    status: i64,
    #[serde(rename = "Vinculado_a")]
    linked_to: i64,
}

/// Request body for `InsertContato`. Address and notes fields are always
/// sent empty.
#[derive(Serialize)]
struct InsertContactBody<'a> {
    #[serde(rename = "Nome")]
    name: &'a str,
    #[serde(rename = "Email")]
    email: &'a str,
    #[serde(rename = "Celular")]
    mobile_phone: &'a str,
    #[serde(rename = "CPF_CGC")]
    cpf_cgc: &'a str,
    #[serde(rename = "Nascimento")]
    birth_date: &'a str,
    #[serde(rename = "Sexo")]
    gender: Gender,
    #[serde(rename = "Endereco_Residencial")]
    street: &'static str,
    #[serde(rename = "Cidade_Residencial")]
    city: &'static str,
    #[serde(rename = "Estado_Residencial")]
    state: &'static str,
    #[serde(rename = "Cep_Residencial")]
    postal_code: &'static str,
    #[serde(rename = "Pais_Residencial")]
    country: &'static str,
    #[serde(rename = "Telefone_Residencial")]
    home_phone: &'static str,
    #[serde(rename = "Observacoes")]
    notes: &'static str,
    #[serde(rename = "Bairro_Residencial")]
    district: &'static str,
    #[serde(rename = "RG")]
    rg: &'static str,
}

/// A resolved HTTP call: method, path relative to the base URL, query pairs
/// and an optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRequest {
    pub method: Method,
    pub path: &'static str,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<Value>,
}

impl Operation {
    /// Parse an item's parameters into an operation.
    ///
    /// # Errors
    /// [`NodeError::InvalidParameters`] for an unknown resource or operation,
    /// or a missing/mistyped parameter.
    pub fn from_parameters(params: &Value) -> Result<Self, NodeError> {
        let resource = params
            .get("resource")
            .ok_or_else(|| NodeError::InvalidParameters("'resource' is required".into()))?;
        let resource = Resource::deserialize(resource).map_err(|e| {
            NodeError::InvalidParameters(format!("unknown resource {resource}: {e}"))
        })?;

        let invalid =
            |e: serde_json::Error| NodeError::InvalidParameters(format!("{resource}: {e}"));

        let op = match resource {
            Resource::Agenda => Operation::Agenda(Deserialize::deserialize(params).map_err(invalid)?),
            Resource::Contact => {
                Operation::Contact(Deserialize::deserialize(params).map_err(invalid)?)
            }
            Resource::Patient => {
                Operation::Patient(Deserialize::deserialize(params).map_err(invalid)?)
            }
            Resource::User => Operation::User(Deserialize::deserialize(params).map_err(invalid)?),
            Resource::Sector => Operation::Sector(Deserialize::deserialize(params).map_err(invalid)?),
        };
        Ok(op)
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Agenda(op) => match op {
                AgendaOperation::Create { .. } => OperationKind::AgendaCreate,
                AgendaOperation::Get { .. } => OperationKind::AgendaGet,
                AgendaOperation::GetByUser { .. } => OperationKind::AgendaGetByUser,
                AgendaOperation::GetBySector { .. } => OperationKind::AgendaGetBySector,
            },
            Operation::Contact(op) => match op {
                ContactOperation::Create { .. } => OperationKind::ContactCreate,
                ContactOperation::GetById { .. } => OperationKind::ContactGetById,
                ContactOperation::Search { .. } => OperationKind::ContactSearch,
            },
            Operation::Patient(PatientOperation::GetAll) => OperationKind::PatientGetAll,
            Operation::User(UserOperation::GetAgendaUsers) => OperationKind::UserGetAgendaUsers,
            Operation::Sector(op) => match op {
                SectorOperation::GetAll => OperationKind::SectorGetAll,
                SectorOperation::GetStatusNames => OperationKind::SectorGetStatusNames,
            },
        }
    }

    /// Resolve to the HTTP call this operation makes.
    pub fn request(&self) -> Result<OperationRequest, NodeError> {
        let kind = self.kind();
        let mut query: Vec<(&'static str, String)> = Vec::new();
        let mut body = None;

        match self {
            Operation::Agenda(AgendaOperation::Create {
                user_id,
                start_date,
                end_date,
                description,
                status,
                linked_to,
            }) => {
                body = Some(serde_json::to_value(InsertAgendaBody {
                    user_id: *user_id,
                    start: start_date,
                    end: end_date,
                    description,
                    status: *status,
                    linked_to: *linked_to,
                })?);
            }
            Operation::Agenda(AgendaOperation::Get {
                start_date,
                end_date,
            }) => {
                query.push(("inicio", start_date.clone()));
                query.push(("fim", end_date.clone()));
            }
            Operation::Agenda(AgendaOperation::GetByUser {
                start_date,
                end_date,
                user_id,
            }) => {
                query.push(("inicio", start_date.clone()));
                query.push(("fim", end_date.clone()));
                query.push(("idUsuario", user_id.to_string()));
            }
            Operation::Agenda(AgendaOperation::GetBySector {
                start_date,
                end_date,
                sector,
            }) => {
                query.push(("inicio", start_date.clone()));
                query.push(("fim", end_date.clone()));
                query.push(("setor", sector.clone()));
            }
            Operation::Contact(ContactOperation::Create {
                name,
                email,
                mobile_phone,
                cpf_cgc,
                birth_date,
                gender,
            }) => {
                body = Some(serde_json::to_value(InsertContactBody {
                    name,
                    email,
                    mobile_phone,
                    cpf_cgc,
                    birth_date,
                    gender: *gender,
                    street: "",
                    city: "",
                    state: "",
                    postal_code: "",
                    country: "",
                    home_phone: "",
                    notes: "",
                    district: "",
                    rg: "",
                })?);
            }
            Operation::Contact(ContactOperation::GetById { contact_id }) => {
                query.push(("idcontato", contact_id.clone()));
            }
            Operation::Contact(ContactOperation::Search { search_term }) => {
                query.push(("Name", search_term.clone()));
            }
            Operation::Patient(_) | Operation::User(_) | Operation::Sector(_) => {}
        }

        Ok(OperationRequest {
            method: kind.method(),
            path: kind.path(),
            query,
            body,
        })
    }
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(params: Value) -> OperationRequest {
        Operation::from_parameters(&params)
            .expect("parameters should parse")
            .request()
            .expect("request should build")
    }

    fn q(pairs: &[(&'static str, &str)]) -> Vec<(&'static str, String)> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn agenda_create_posts_body() {
        let req = resolve(json!({
            "resource": "agenda",
            "operation": "create",
            "userId": 7,
            "startDate": "2024-01-01T09:00:00",
            "endDate": "2024-01-01T10:00:00",
            "description": "Consulta",
            "status": 2,
            "linkedTo": 42,
        }));

        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path, "/api/integration/insertagenda");
        assert!(req.query.is_empty());
        assert_eq!(
            req.body,
            Some(json!({
                "Id_do_Usuario": 7,
                "Inicio": "2024-01-01T09:00:00",
                "Final": "2024-01-01T10:00:00",
                "Descricao": "Consulta",
                "Status": 2,
                "Vinculado_a": 42,
            }))
        );
    }

    #[test]
    fn agenda_create_applies_status_and_link_defaults() {
        let req = resolve(json!({
            "resource": "agenda",
            "operation": "create",
            "userId": 1,
            "startDate": "a",
            "endDate": "b",
            "description": "d",
        }));
        let body = req.body.unwrap();
        assert_eq!(body["Status"], 1);
        assert_eq!(body["Vinculado_a"], 0);
    }

    #[test]
    fn agenda_get_uses_date_range_query() {
        let req = resolve(json!({
            "resource": "agenda",
            "operation": "get",
            "startDate": "2024-01-01",
            "endDate": "2024-01-31",
        }));
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.path, "/api/integration/GetAgenda");
        assert_eq!(req.query, q(&[("inicio", "2024-01-01"), ("fim", "2024-01-31")]));
        assert_eq!(req.body, None);
    }

    #[test]
    fn agenda_get_by_user_adds_user_id() {
        let req = resolve(json!({
            "resource": "agenda",
            "operation": "getByUser",
            "startDate": "2024-01-01",
            "endDate": "2024-01-31",
            "userId": 12,
        }));
        assert_eq!(req.path, "/api/integration/GetAgendabyUsuario");
        assert_eq!(
            req.query,
            q(&[("inicio", "2024-01-01"), ("fim", "2024-01-31"), ("idUsuario", "12")])
        );
    }

    #[test]
    fn agenda_get_by_sector_adds_sector() {
        let req = resolve(json!({
            "resource": "agenda",
            "operation": "getBySector",
            "startDate": "2024-01-01",
            "endDate": "2024-01-31",
            "sector": "Cardiologia",
        }));
        assert_eq!(req.path, "/api/integration/GetAgendabySetor");
        assert_eq!(
            req.query,
            q(&[("inicio", "2024-01-01"), ("fim", "2024-01-31"), ("setor", "Cardiologia")])
        );
    }

    #[test]
    fn contact_create_sends_fixed_empty_fields() {
        let req = resolve(json!({
            "resource": "contact",
            "operation": "create",
            "name": "Jane Doe",
            "email": "",
        }));

        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path, "/api/integration/InsertContato");
        assert_eq!(
            req.body,
            Some(json!({
                "Nome": "Jane Doe",
                "Email": "",
                "Celular": "",
                "CPF_CGC": "",
                "Nascimento": "",
                "Sexo": "M",
                "Endereco_Residencial": "",
                "Cidade_Residencial": "",
                "Estado_Residencial": "",
                "Cep_Residencial": "",
                "Pais_Residencial": "",
                "Telefone_Residencial": "",
                "Observacoes": "",
                "Bairro_Residencial": "",
                "RG": "",
            }))
        );
    }

    #[test]
    fn contact_create_passes_gender_through() {
        let req = resolve(json!({
            "resource": "contact",
            "operation": "create",
            "name": "Ana",
            "gender": "F",
            "mobilePhone": "11999990000",
        }));
        let body = req.body.unwrap();
        assert_eq!(body["Sexo"], "F");
        assert_eq!(body["Celular"], "11999990000");
    }

    #[test]
    fn contact_lookups_use_query_parameters() {
        let by_id = resolve(json!({
            "resource": "contact", "operation": "getById", "contactId": "981",
        }));
        assert_eq!(by_id.path, "/api/integration/GetContatosById");
        assert_eq!(by_id.query, q(&[("idcontato", "981")]));

        let search = resolve(json!({
            "resource": "contact", "operation": "search", "searchTerm": "Silva",
        }));
        assert_eq!(search.path, "/api/integration/GetContatosGridBySearch");
        assert_eq!(search.query, q(&[("Name", "Silva")]));
    }

    #[test]
    fn parameterless_operations_resolve_to_plain_gets() {
        let cases = [
            ("patient", "getAll", "/api/integration/GetPacientes"),
            ("user", "getAgendaUsers", "/api/integration/GetUsuariosAgenda"),
            ("sector", "getAll", "/api/integration/GetSetor"),
            ("sector", "getStatusNames", "/api/integration/GetStatusNomeAgenda"),
        ];
        for (resource, operation, path) in cases {
            let req = resolve(json!({ "resource": resource, "operation": operation }));
            assert_eq!(req.method, Method::GET, "{resource}/{operation}");
            assert_eq!(req.path, path, "{resource}/{operation}");
            assert!(req.query.is_empty());
            assert!(req.body.is_none());
        }
    }

    #[test]
    fn unused_parameters_are_ignored() {
        let op = Operation::from_parameters(&json!({
            "resource": "patient",
            "operation": "getAll",
            "startDate": "2024-01-01",
        }))
        .unwrap();
        assert_eq!(op, Operation::Patient(PatientOperation::GetAll));
    }

    #[test]
    fn integral_float_ids_are_accepted() {
        let req = resolve(json!({
            "resource": "agenda",
            "operation": "create",
            "userId": 7.0,
            "startDate": "a",
            "endDate": "b",
            "description": "d",
            "status": 2.0,
        }));
        let body = req.body.unwrap();
        assert_eq!(body["Id_do_Usuario"], 7);
        assert_eq!(body["Status"], 2);

        let by_user = resolve(json!({
            "resource": "agenda",
            "operation": "getByUser",
            "startDate": "a",
            "endDate": "b",
            "userId": 12.0,
        }));
        assert_eq!(by_user.query[2], ("idUsuario", "12".to_owned()));
    }

    #[test]
    fn mistyped_parameters_are_rejected() {
        let text_id = Operation::from_parameters(&json!({
            "resource": "agenda",
            "operation": "getByUser",
            "startDate": "a",
            "endDate": "b",
            "userId": "abc",
        }))
        .unwrap_err();
        assert!(matches!(text_id, NodeError::InvalidParameters(_)));

        let fractional = Operation::from_parameters(&json!({
            "resource": "agenda",
            "operation": "getByUser",
            "startDate": "a",
            "endDate": "b",
            "userId": 7.5,
        }))
        .unwrap_err();
        assert!(matches!(fractional, NodeError::InvalidParameters(msg) if msg.contains("integer")));

        let numeric_sector = Operation::from_parameters(&json!({
            "resource": "agenda",
            "operation": "getBySector",
            "startDate": "a",
            "endDate": "b",
            "sector": 4,
        }))
        .unwrap_err();
        assert!(matches!(numeric_sector, NodeError::InvalidParameters(_)));
    }

    #[test]
    fn unknown_resource_is_rejected() {
        let err = Operation::from_parameters(&json!({ "resource": "invoice", "operation": "get" }))
            .unwrap_err();
        assert!(matches!(err, NodeError::InvalidParameters(msg) if msg.contains("invoice")));
    }

    #[test]
    fn unimplemented_agenda_update_is_rejected() {
        let err = Operation::from_parameters(&json!({ "resource": "agenda", "operation": "update" }))
            .unwrap_err();
        assert!(matches!(err, NodeError::InvalidParameters(msg) if msg.contains("update")));
    }

    #[test]
    fn missing_required_parameter_is_rejected() {
        let err = Operation::from_parameters(&json!({
            "resource": "agenda",
            "operation": "get",
            "startDate": "2024-01-01",
        }))
        .unwrap_err();
        assert!(matches!(err, NodeError::InvalidParameters(msg) if msg.contains("endDate")));
    }

    #[test]
    fn missing_resource_is_rejected() {
        assert!(matches!(
            Operation::from_parameters(&json!({ "operation": "get" })),
            Err(NodeError::InvalidParameters(_))
        ));
    }

    #[test]
    fn parsed_operations_report_their_kind() {
        for kind in OperationKind::ALL {
            let op = Operation::from_parameters(&json!({
                "resource": kind.resource().as_str(),
                "operation": kind.name(),
                "userId": 1,
                "startDate": "s",
                "endDate": "e",
                "description": "d",
                "sector": "x",
                "name": "n",
                "contactId": "1",
                "searchTerm": "t",
            }))
            .unwrap_or_else(|e| panic!("{kind:?}: {e}"));
            assert_eq!(op.kind(), kind);

            let req = op.request().unwrap();
            assert_eq!(req.method, kind.method());
            assert_eq!(req.path, kind.path());
        }
    }
}
