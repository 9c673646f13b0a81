// Handler module for the landing page.
// Template and context provider registrations live in src/main.rs.
