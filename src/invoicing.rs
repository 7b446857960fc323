//! In-memory invoicing data used by the demo pages the bundled guides walk through
//!
//! Nothing here is persisted; each collaborator starts from its seed data.

use serde::{Deserialize, Serialize};

/// Tax applied on top of the line item subtotal
pub const TAX_RATE: f64 = 0.1;

const INVOICE_NUMBER_PREFIX: &str = "INV-";
const INVOICE_NUMBER_WIDTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLineItem {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total: f64,
}

impl InvoiceLineItem {
    pub fn for_product(id: impl Into<String>, product: &Product, quantity: u32) -> Self {
        Self {
            id: id.into(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity,
            unit_price: product.price,
            total: product.price * f64::from(quantity),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub invoice_number: String,
    pub customer_id: String,
    pub customer_name: String,
    pub date: String,
    pub line_items: Vec<InvoiceLineItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub status: InvoiceStatus,
}

/// Input to [`InvoiceStore::create`]; id, number and totals are filled in by the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub customer: Customer,
    pub date: String,
    pub line_items: Vec<InvoiceLineItem>,
    pub status: InvoiceStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

#[derive(Debug, Clone)]
pub struct CustomerDirectory {
    customers: Vec<Customer>,
}

impl CustomerDirectory {
    pub fn new(customers: Vec<Customer>) -> Self {
        Self { customers }
    }

    pub fn seeded() -> Self {
        let customer = |id: &str, name: &str, email: &str, phone: &str, address: &str| Customer {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            address: address.to_string(),
        };

        Self::new(vec![
            customer("1", "Acme Corporation", "contact@acme.com", "+1 555-0100", "123 Business St, New York, NY 10001"),
            customer("2", "TechStart Inc", "info@techstart.com", "+1 555-0200", "456 Innovation Ave, San Francisco, CA 94102"),
            customer("3", "Global Solutions Ltd", "hello@globalsolutions.com", "+1 555-0300", "789 Enterprise Blvd, Chicago, IL 60601"),
        ])
    }

    pub fn get_all(&self) -> &[Customer] {
        &self.customers
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }
}

#[derive(Debug, Clone)]
pub struct ProductCatalog {
    products: Vec<Product>,
}

impl ProductCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn seeded() -> Self {
        let product = |id: &str, name: &str, description: &str, price: f64| Product {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            price,
        };

        Self::new(vec![
            product("1", "Professional Service - Hourly", "Professional consulting services billed hourly", 150.0),
            product("2", "Software License - Annual", "Annual software license subscription", 1200.0),
            product("3", "Training Session", "On-site or virtual training session", 500.0),
            product("4", "Support Package - Premium", "Premium support package with 24/7 availability", 2500.0),
            product("5", "Custom Development", "Custom software development per project", 5000.0),
        ])
    }

    pub fn get_all(&self) -> &[Product] {
        &self.products
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Case-insensitive substring search over name and description
    pub fn search(&self, query: &str) -> Vec<&Product> {
        let query = query.to_lowercase();
        self.products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&query) || p.description.to_lowercase().contains(&query))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct InvoiceStore {
    invoices: Vec<Invoice>,
    next_id: u64,
}

impl InvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_all(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Invoice> {
        self.invoices.iter().find(|i| i.id == id)
    }

    /// Store a new invoice, numbering it after the invoices already held
    pub fn create(&mut self, new_invoice: NewInvoice) -> &Invoice {
        self.next_id += 1;
        let totals = Self::calculate_totals(&new_invoice.line_items);
        let invoice_number = format!(
            "{}{:0width$}",
            INVOICE_NUMBER_PREFIX,
            self.invoices.len() + 1,
            width = INVOICE_NUMBER_WIDTH
        );

        log::debug!("Created invoice {} for {}", invoice_number, new_invoice.customer.name);
        let index = self.invoices.len();
        self.invoices.push(Invoice {
            id: self.next_id.to_string(),
            invoice_number,
            customer_id: new_invoice.customer.id,
            customer_name: new_invoice.customer.name,
            date: new_invoice.date,
            line_items: new_invoice.line_items,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            status: new_invoice.status,
        });
        &self.invoices[index]
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.invoices.len();
        self.invoices.retain(|i| i.id != id);
        self.invoices.len() != before
    }

    pub fn calculate_totals(line_items: &[InvoiceLineItem]) -> Totals {
        let subtotal: f64 = line_items.iter().map(|item| item.total).sum();
        let tax = subtotal * TAX_RATE;
        Totals {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }
}
