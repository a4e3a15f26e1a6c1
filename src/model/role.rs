#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
    Faculty = 4,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Employee),
            4 => Some(Role::Faculty),
            _ => None,
        }
    }

    /// Roles whose members are expected to tap in daily. Admin and HR
    /// accounts are back-office and never appear on the dashboard.
    pub fn is_attendance_tracked(&self) -> bool {
        matches!(self, Role::Employee | Role::Faculty)
    }

    pub fn tracked_ids() -> [u8; 2] {
        [Role::Employee as u8, Role::Faculty as u8]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Hr => "HR",
            Role::Employee => "Employee",
            Role::Faculty => "Faculty",
        }
    }
}
