fn main() {
    deckgen_lib::run()
}
