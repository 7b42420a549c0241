use crate::api::attendance::{ClockReq, ClockResponse, StatusResponse};
use crate::api::employee::EmployeeListResponse;
use crate::api::history::{DayView, HistoryResponse, Period, SummaryResponse};
use crate::clock::gate::ClockAction;
use crate::clock::ledger::{DayGroup, SortOrder};
use crate::clock::status::Status;
use crate::model::attendance::{RecordKind, TimeRecord};
use crate::model::employee::Employee;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Timeclock API",
        version = "1.0.0",
        description = r#"
## Timeclock

Attendance tracking for a small company: clock in, clock out, pause, and
review the history.

### 🔹 Key Features
- **Clock panel**
  - Start/end work, start/end breaks, guarded by the attendance state machine
- **Live status**
  - Current state (out / working / on break) and net minutes so far today
- **History**
  - Day-grouped records, weekly and monthly net totals, CSV export
- **Roles**
  - Employees see their own records; Admin and Inspector can view everyone's

### 🔐 Security
All clock and history endpoints are protected with **JWT Bearer
authentication**. Clock mutations always apply to the caller's own records,
whatever the role.

### 📦 Response Format
- JSON-based RESTful responses; CSV for the history export

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::start_work,
        crate::api::attendance::end_work,
        crate::api::attendance::start_break,
        crate::api::attendance::end_break,
        crate::api::attendance::clock_status,

        crate::api::history::history,
        crate::api::history::summary,
        crate::api::history::export,

        crate::api::employee::list_employees
    ),
    components(
        schemas(
            ClockReq,
            ClockResponse,
            StatusResponse,
            ClockAction,
            Status,
            RecordKind,
            TimeRecord,
            SortOrder,
            DayGroup,
            DayView,
            HistoryResponse,
            Period,
            SummaryResponse,
            Employee,
            EmployeeListResponse
        )
    ),
    tags(
        (name = "Clock", description = "Clock in/out and break APIs"),
        (name = "History", description = "Attendance history and report APIs"),
        (name = "Employee", description = "Employee directory APIs"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
