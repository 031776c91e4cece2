//! The interactive shell: one run of it is one browsing context.
//!
//! The cart and the chat history live here in memory. The session scope of
//! the store is shared with the shell and ends with it.

use std::io::Write;

use anyhow::{Context as _, Result, anyhow, bail};
use basho_assistant::{Assistant, ChatMessage};
use basho_core::{
  cart::Cart,
  catalog::{self, Category},
  checkout::{ShippingDetails, Storefront},
  session::Registration,
  store::KeyValueStore,
};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt as _, BufReader};

use crate::render;

pub const GREETING: &str =
  "Welcome. I am the spirit of the kiln. How can I assist your journey today?";

const SIGN_UP_FIRST: &str =
  "We could not find an artisan with this email. Please sign up first.";

// ─── Commands ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(multicall = true)]
struct ShellLine {
  #[command(subcommand)]
  command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ShellCommand {
  /// Create an account and sign in.
  Register { name: String, email: String },
  /// Sign in with a registered email.
  Login { email: String },
  /// Sign out. Your account and history are kept.
  Logout,
  /// Show who is signed in.
  Whoami,
  /// List products, optionally only one category.
  Products { category: Option<String> },
  /// List upcoming workshops.
  Workshops,
  /// Put one unit of a product in the cart.
  Add { product: String },
  /// Take a product out of the cart.
  Remove { product: String },
  /// Set the quantity of a product already in the cart.
  Qty { product: String, quantity: u32 },
  /// Show the cart.
  Cart,
  /// Empty the cart.
  Clear,
  /// Pay for the cart (simulated).
  Checkout,
  /// Buy a single product straight away (simulated).
  Buy {
    product: String,
    #[arg(long)]
    address: String,
    /// Defaults to the signed-in account's name.
    #[arg(long)]
    name:    Option<String>,
    /// Defaults to the signed-in account's email.
    #[arg(long)]
    email:   Option<String>,
  },
  /// Reserve a seat in a workshop.
  Book { workshop: String },
  /// Show your orders, bookings and spend.
  Dashboard,
  /// Talk to the studio assistant.
  Chat {
    #[arg(required = true, trailing_var_arg = true)]
    message: Vec<String>,
  },
  /// Leave the shell.
  #[command(alias = "exit")]
  Quit,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
  Continue,
  Quit,
}

/// Split a line into words, honouring single and double quotes.
pub fn split_words(line: &str) -> Result<Vec<String>> {
  let mut words = Vec::new();
  let mut current = String::new();
  let mut in_word = false;
  let mut quote: Option<char> = None;

  for c in line.chars() {
    match quote {
      Some(q) if c == q => quote = None,
      Some(_) => current.push(c),
      None if c == '"' || c == '\'' => {
        quote = Some(c);
        in_word = true;
      }
      None if c.is_whitespace() => {
        if in_word {
          words.push(std::mem::take(&mut current));
          in_word = false;
        }
      }
      None => {
        current.push(c);
        in_word = true;
      }
    }
  }

  if quote.is_some() {
    bail!("unclosed quote");
  }
  if in_word {
    words.push(current);
  }
  Ok(words)
}

// ─── Shell ────────────────────────────────────────────────────────────────────

pub struct Shell<S> {
  shop:      Storefront<S>,
  assistant: Option<Assistant>,
  cart:      Cart,
  history:   Vec<ChatMessage>,
}

impl<S: KeyValueStore> Shell<S> {
  pub fn new(shop: Storefront<S>, assistant: Option<Assistant>) -> Self {
    Self {
      shop,
      assistant,
      cart: Cart::new(),
      history: vec![ChatMessage::model(GREETING)],
    }
  }

  /// Read commands from stdin until `quit` or end of input.
  pub async fn run(&mut self) -> Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(stdout, "Basho studio. Type `help` for commands.")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
      write!(stdout, "basho> ")?;
      stdout.flush()?;

      let Some(line) = lines.next_line().await.context("reading stdin")? else {
        writeln!(stdout)?;
        break;
      };

      match self.handle_line(&line, &mut stdout).await {
        Ok(Flow::Quit) => break,
        Ok(Flow::Continue) => {}
        Err(err) => writeln!(stdout, "error: {err:#}")?,
      }
    }
    Ok(())
  }

  /// Parse and execute one line of input.
  pub async fn handle_line(&mut self, line: &str, out: &mut impl Write) -> Result<Flow> {
    let words = split_words(line)?;
    if words.is_empty() {
      return Ok(Flow::Continue);
    }

    match ShellLine::try_parse_from(words) {
      Ok(parsed) => self.execute(parsed.command, out).await,
      Err(err) => {
        write!(out, "{}", err.render())?;
        Ok(Flow::Continue)
      }
    }
  }

  pub async fn execute(&mut self, command: ShellCommand, out: &mut impl Write) -> Result<Flow> {
    let accounts = self.shop.accounts();

    match command {
      ShellCommand::Register { name, email } => match accounts.register(&name, &email).await? {
        Registration::Created(user) => writeln!(out, "Welcome, {}. You are signed in.", user.name)?,
        Registration::Duplicate(user) => writeln!(
          out,
          "An account already exists for {}. Use `login` instead.",
          user.email
        )?,
      },

      ShellCommand::Login { email } => match accounts.login(&email).await? {
        Some(user) => writeln!(out, "Welcome back, {}.", user.name)?,
        None => writeln!(out, "{SIGN_UP_FIRST}")?,
      },

      ShellCommand::Logout => {
        accounts.logout().await?;
        writeln!(out, "Signed out.")?;
      }

      ShellCommand::Whoami => match accounts.current_user().await? {
        Some(user) => writeln!(out, "{} <{}>", user.name, user.email)?,
        None => writeln!(out, "Not signed in.")?,
      },

      ShellCommand::Products { category } => {
        let filter = match category.as_deref() {
          None | Some("all" | "All") => None,
          Some(label) => Some(
            Category::from_label(label).ok_or_else(|| anyhow!("unknown category {label:?}"))?,
          ),
        };
        let products = catalog::products_in(filter);
        if products.is_empty() {
          writeln!(out, "No pieces found in this collection.")?;
        }
        render::products(out, products)?;
      }

      ShellCommand::Workshops => render::workshops(out, catalog::workshops())?,

      ShellCommand::Add { product } => {
        let product = find_product(&product)?;
        self.cart.add(product)?;
        writeln!(out, "Added {}. Cart: {} item(s).", product.name, self.cart.item_count())?;
      }

      ShellCommand::Remove { product } => {
        if !self.cart.remove(&product) {
          writeln!(out, "{product} is not in your cart.")?;
        }
        render::cart(out, &self.cart)?;
      }

      ShellCommand::Qty { product, quantity } => {
        self.cart.set_quantity(&product, quantity)?;
        render::cart(out, &self.cart)?;
      }

      ShellCommand::Cart => render::cart(out, &self.cart)?,

      ShellCommand::Clear => {
        self.cart.clear();
        writeln!(out, "Cart cleared.")?;
      }

      ShellCommand::Checkout => {
        self.shop.checkout_cart(&mut self.cart).await?;
        self.show_confirmation(out).await?;
      }

      ShellCommand::Buy {
        product,
        address,
        name,
        email,
      } => {
        let product = find_product(&product)?;
        let user = accounts.current_user().await?;
        let shipping = ShippingDetails {
          name: name
            .or_else(|| user.as_ref().map(|u| u.name.clone()))
            .unwrap_or_default(),
          email: email
            .or_else(|| user.as_ref().map(|u| u.email.to_string()))
            .unwrap_or_default(),
          address,
        };
        self.shop.buy_now(product, &shipping).await?;
        self.show_confirmation(out).await?;
      }

      ShellCommand::Book { workshop } => {
        let workshop =
          catalog::workshop(&workshop).ok_or_else(|| anyhow!("unknown workshop {workshop:?}"))?;
        let booking = self.shop.book_workshop(workshop).await?;
        writeln!(
          out,
          "Registration confirmed: {} for {} ({}), ref {}",
          booking.slot, booking.workshop_title, booking.date, booking.id
        )?;
      }

      ShellCommand::Dashboard => {
        let dashboard = self.shop.dashboard().await?;
        render::dashboard(out, &dashboard)?;
      }

      ShellCommand::Chat { message } => {
        let Some(assistant) = &self.assistant else {
          bail!("the assistant is not configured; set GEMINI_API_KEY");
        };
        let message = message.join(" ");
        let reply = assistant.reply(&self.history, &message).await;
        self.history.push(ChatMessage::user(message));
        self.history.push(ChatMessage::model(reply.clone()));
        writeln!(out, "{reply}")?;
      }

      ShellCommand::Quit => return Ok(Flow::Quit),
    }

    Ok(Flow::Continue)
  }

  async fn show_confirmation(&self, out: &mut impl Write) -> Result<()> {
    match self.shop.take_confirmation().await? {
      Some(confirmation) => render::confirmation(out, &confirmation)?,
      None => writeln!(out, "Order placed.")?,
    }
    Ok(())
  }
}

fn find_product(id: &str) -> Result<&'static catalog::Product> {
  catalog::product(id).ok_or_else(|| anyhow!("unknown product {id:?}"))
}
