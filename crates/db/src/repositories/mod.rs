//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Every tenant-owned repository takes the tenant id first and filters each
//! read, update and delete by it.

pub mod category;
pub mod company;
pub mod customer;
pub mod employee;
pub mod error;
pub mod error_log;
pub mod expense;
pub mod fuel;
pub mod income;
pub mod payment;
pub mod query;
pub mod report;
pub mod user;
pub mod vehicle;

pub use category::{
    CategoryFilter, CategoryRepository, CreateCategoryInput, UpdateCategoryInput,
};
pub use company::{CompanyRepository, CreateCompanyInput, UpdateCompanyInput};
pub use customer::{CreateCustomerInput, CustomerRepository, UpdateCustomerInput};
pub use employee::{CreateEmployeeInput, EmployeeFilter, EmployeeRepository, UpdateEmployeeInput};
pub use error::RepositoryError;
pub use error_log::{ErrorLogRepository, NewErrorLog};
pub use expense::{
    CreateExpenseInput, ExpenseFilter, ExpenseRepository, ExpenseWithRelated, UpdateExpenseInput,
};
pub use fuel::{CreateFuelInput, FuelFilter, FuelRepository, UpdateFuelInput};
pub use income::{CreateIncomeInput, IncomeFilter, IncomeRepository, UpdateIncomeInput};
pub use payment::{CreatePaymentInput, PaymentFilter, PaymentRepository, UpdatePaymentInput};
pub use report::ReportRepository;
pub use user::{CreateUserInput, UpdateUserInput, UserRepository};
pub use vehicle::{CreateVehicleInput, UpdateVehicleInput, VehicleFilter, VehicleRepository};
