pub mod prismic_date;
